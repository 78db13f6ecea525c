//! # Joint Parameters
//!
//! User-facing inputs and the dimensions derived from them.
//!
//! Derivation runs once per build and validates everything up front, so
//! generators downstream never check their inputs again.

use config::constants::{
    ANGLE_TOLERANCE, AXLE_OVERLAP, DEFAULT_CLEARANCE, DEFAULT_DOWN_ANGLE,
    DEFAULT_HORIZONTAL_ANGLE, DEFAULT_RESOLUTION, DEFAULT_SIZE, DEFAULT_UP_ANGLE,
    MAX_BEND_ANGLE, MIN_AXLE_TIP_RADIUS, MIN_CLEARANCE, MIN_HALF_ARM_WIDTH, MIN_RESOLUTION,
    MIN_SIZE, MIN_WALL_WIDTH, PRINT_ANGLE,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::JointError;

// =============================================================================
// INPUTS
// =============================================================================

/// Whether the separator stops rotation on one side or is shared by two
/// mirrored halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointVariant {
    /// One joint half with its own rotation stop.
    #[default]
    OneSided,
    /// Two mirrored halves fused by a shared separator.
    TwoSided,
}

/// A joint construction request.
///
/// Angles are radians. Lengths are millimetres. Missing fields take their
/// defaults when deserialized.
///
/// # Example
///
/// ```rust
/// use fdm_joint::{JointInputs, JointVariant};
///
/// let inputs = JointInputs {
///     variant: JointVariant::TwoSided,
///     size: 6.0,
///     ..JointInputs::default()
/// };
/// assert_eq!(inputs.resolution, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointInputs {
    pub variant: JointVariant,
    /// Socket diameter.
    pub size: f64,
    pub up_angle: f64,
    pub down_angle: f64,
    /// Sideways bending limit; has no effect past what the axle allows.
    pub horizontal_angle: f64,
    /// Print clearance between moving parts.
    pub clearance: f64,
    /// Vertices per circular loop.
    pub resolution: u32,
}

impl Default for JointInputs {
    fn default() -> Self {
        Self {
            variant: JointVariant::default(),
            size: DEFAULT_SIZE,
            up_angle: DEFAULT_UP_ANGLE,
            down_angle: DEFAULT_DOWN_ANGLE,
            horizontal_angle: DEFAULT_HORIZONTAL_ANGLE,
            clearance: DEFAULT_CLEARANCE,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

// =============================================================================
// DERIVED PARAMETERS
// =============================================================================

/// Validated inputs plus every dimension derived from them.
///
/// Coordinates are in the joint's local frame: origin at the axle centre,
/// X along the axle, Y along the arm, Z up.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct ParameterSet {
    pub variant: JointVariant,
    pub size: f64,
    pub up_angle: f64,
    pub down_angle: f64,
    pub horizontal_angle: f64,
    pub clearance: f64,
    pub resolution: u32,
    /// Angle between consecutive loop vertices.
    pub angle_step: f64,
    pub half_arm_width: f64,
    pub wall_width: f64,
    /// Radius at the axle tips.
    pub axle_min_r: f64,
    /// Distance from the axle centre to the socket wall minus clearance.
    pub axle_major_r: f64,
    /// Axle reach along X.
    pub axle_x: f64,
    /// Axle radius where it meets the arm.
    pub axle_r: f64,
    /// Depth the socket and arm space extend below the axle.
    pub bottom: f64,
    pub arm_length: f64,
    pub separator_outer_r: f64,
    pub separator_y: f64,
    /// How far the arm can swing sideways before hitting the socket.
    pub bendable_angle: f64,
    /// Lift applied to the finished part so it sits above the bed cut.
    pub raise_z: f64,
}

impl ParameterSet {
    /// Validates `inputs` and derives all joint dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`JointError::Constraint`] when an input is out of range or
    /// the axle cannot clear the arm at the requested clearance.
    pub fn derive(inputs: &JointInputs) -> Result<Self, JointError> {
        check_inputs(inputs)?;

        let size = inputs.size;
        let clearance = inputs.clearance;
        // Snap angles that passed within tolerance onto the valid range.
        let [up_angle, down_angle, horizontal_angle] =
            [inputs.up_angle, inputs.down_angle, inputs.horizontal_angle]
                .map(|a| a.clamp(0.0, MAX_BEND_ANGLE));

        let half_arm_width = MIN_HALF_ARM_WIDTH.max(0.3 * size / 2.0);
        let wall_width = MIN_WALL_WIDTH.max(0.25 * size / 2.0);
        let axle_min_r = MIN_AXLE_TIP_RADIUS.max(size / 6.0);
        let axle_major_r = size / 2.0 - clearance;

        let reach_sq = axle_major_r * axle_major_r - axle_min_r * axle_min_r;
        if !(reach_sq > 0.0) {
            return Err(axle_too_small());
        }
        let axle_x = reach_sq.sqrt();
        if axle_x - AXLE_OVERLAP < half_arm_width + clearance {
            return Err(axle_too_small());
        }

        let axle_r = axle_min_r + (axle_x - half_arm_width) / PRINT_ANGLE.tan();
        let bendable_angle = ((axle_x - AXLE_OVERLAP - half_arm_width) / (size / 2.0 + clearance))
            .min(1.0)
            .asin()
            .clamp(0.0, horizontal_angle);

        Ok(Self {
            variant: inputs.variant,
            size,
            up_angle,
            down_angle,
            horizontal_angle,
            clearance,
            resolution: inputs.resolution,
            angle_step: TAU / inputs.resolution as f64,
            half_arm_width,
            wall_width,
            axle_min_r,
            axle_major_r,
            axle_x,
            axle_r,
            bottom: 1.5 * size,
            arm_length: size / 2.0 + wall_width + 2.0 * clearance,
            separator_outer_r: 2.0 * size,
            separator_y: size / 2.0 + wall_width,
            bendable_angle,
            raise_z: 1.5 * axle_r,
        })
    }
}

fn axle_too_small() -> JointError {
    JointError::constraint("axle size is too small and/or clearance is too large")
}

/// Range checks on raw inputs.
fn check_inputs(inputs: &JointInputs) -> Result<(), JointError> {
    if !inputs.size.is_finite() || inputs.size < MIN_SIZE {
        return Err(JointError::constraint(format!(
            "size must be at least {MIN_SIZE} mm, got {}",
            inputs.size
        )));
    }
    if !inputs.clearance.is_finite() || inputs.clearance < MIN_CLEARANCE {
        return Err(JointError::constraint(format!(
            "clearance must be at least {MIN_CLEARANCE} mm, got {}",
            inputs.clearance
        )));
    }

    let angles = [
        ("up_angle", inputs.up_angle),
        ("down_angle", inputs.down_angle),
        ("horizontal_angle", inputs.horizontal_angle),
    ];
    for (name, angle) in angles {
        if !(-ANGLE_TOLERANCE..=MAX_BEND_ANGLE + ANGLE_TOLERANCE).contains(&angle) {
            return Err(JointError::constraint(format!(
                "{name} must be within [0, {:.1}] degrees, got {angle}",
                MAX_BEND_ANGLE.to_degrees()
            )));
        }
    }

    if inputs.resolution < MIN_RESOLUTION || inputs.resolution % 2 != 0 {
        return Err(JointError::constraint(format!(
            "resolution must be an even number of at least {MIN_RESOLUTION}, got {}",
            inputs.resolution
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs(size: f64, clearance: f64) -> JointInputs {
        JointInputs {
            size,
            clearance,
            ..JointInputs::default()
        }
    }

    #[test]
    fn test_default_derivation() {
        let p = ParameterSet::derive(&JointInputs::default()).unwrap();
        assert_relative_eq!(p.half_arm_width, 0.6);
        assert_relative_eq!(p.wall_width, 0.8);
        assert_relative_eq!(p.axle_min_r, 4.0 / 6.0);
        assert_relative_eq!(p.axle_major_r, 1.7);
        assert_relative_eq!(p.axle_x, (1.7f64.powi(2) - (4.0f64 / 6.0).powi(2)).sqrt());
        assert_relative_eq!(p.axle_r, p.axle_min_r + p.axle_x - 0.6, epsilon = 1e-12);
        assert_relative_eq!(p.bottom, 6.0);
        assert_relative_eq!(p.arm_length, 2.0 + 0.8 + 0.6);
        assert_relative_eq!(p.separator_outer_r, 8.0);
        assert_relative_eq!(p.separator_y, 2.8);
        assert_relative_eq!(p.raise_z, 1.5 * p.axle_r);
        assert_relative_eq!(p.angle_step, TAU / 64.0);
        assert!(p.axle_x - AXLE_OVERLAP >= p.half_arm_width + p.clearance);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let request = inputs(5.3, 0.25);
        assert_eq!(
            ParameterSet::derive(&request).unwrap(),
            ParameterSet::derive(&request).unwrap()
        );
    }

    #[test]
    fn test_small_size_boundary() {
        assert!(ParameterSet::derive(&inputs(2.9, 0.1)).is_ok());
        assert!(matches!(
            ParameterSet::derive(&inputs(2.9, 0.3)),
            Err(JointError::Constraint(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_inputs() {
        let too_small = ParameterSet::derive(&inputs(2.0, 0.3)).unwrap_err();
        assert!(too_small.to_string().contains("size"));

        assert!(ParameterSet::derive(&inputs(4.0, 0.05)).is_err());
        assert!(ParameterSet::derive(&inputs(f64::NAN, 0.3)).is_err());

        let odd = JointInputs {
            resolution: 33,
            ..JointInputs::default()
        };
        assert!(ParameterSet::derive(&odd).is_err());

        let steep = JointInputs {
            up_angle: 50f64.to_radians(),
            ..JointInputs::default()
        };
        let err = ParameterSet::derive(&steep).unwrap_err();
        assert!(err.to_string().contains("up_angle"));
    }

    #[test]
    fn test_huge_clearance_is_a_constraint_error() {
        // The axle radius would go negative; must not produce NaN dimensions.
        assert!(matches!(
            ParameterSet::derive(&inputs(4.0, 1.9)),
            Err(JointError::Constraint(_))
        ));
    }

    #[test]
    fn test_bendable_angle_non_increasing_in_clearance() {
        let mut previous = f64::INFINITY;
        let mut clearance = MIN_CLEARANCE;
        while let Ok(p) = ParameterSet::derive(&inputs(6.0, clearance)) {
            assert!(p.bendable_angle <= previous);
            assert!(p.bendable_angle >= 0.0);
            previous = p.bendable_angle;
            clearance += 0.05;
        }
        assert!(clearance > 0.5, "sweep stopped early at {clearance}");
    }

    #[test]
    fn test_bendable_angle_clamped_by_horizontal_limit() {
        let request = JointInputs {
            size: 10.0,
            horizontal_angle: 5f64.to_radians(),
            ..JointInputs::default()
        };
        let p = ParameterSet::derive(&request).unwrap();
        assert_relative_eq!(p.bendable_angle, 5f64.to_radians());

        let locked = JointInputs {
            horizontal_angle: 0.0,
            ..request
        };
        assert_eq!(ParameterSet::derive(&locked).unwrap().bendable_angle, 0.0);
    }

    #[test]
    fn test_inputs_deserialize_with_defaults() {
        let parsed: JointInputs =
            serde_json::from_str(r#"{ "variant": "two_sided", "size": 6.5 }"#).unwrap();
        assert_eq!(parsed.variant, JointVariant::TwoSided);
        assert_eq!(parsed.size, 6.5);
        assert_eq!(parsed.clearance, DEFAULT_CLEARANCE);
        assert_eq!(parsed.resolution, DEFAULT_RESOLUTION);
    }
}
