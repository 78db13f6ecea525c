//! Centralized configuration values shared across the FDM joint pipeline.
//!
//! Each public item in this module documents its purpose and, where it helps,
//! provides a minimal usage example so that downstream crates can remain
//! declarative and avoid scattering literals.

use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, PI};
use std::fmt;

// =============================================================================
// JOINT GEOMETRY CONSTANTS
// =============================================================================

/// Reference overhang angle for chamfers that print without supports (45°).
///
/// Several derivations assume `tan(PRINT_ANGLE) == 1`; do not change it
/// without revisiting the axle and arm chamfers.
///
/// # Examples
/// ```
/// use config::constants::PRINT_ANGLE;
/// assert!((PRINT_ANGLE.to_degrees() - 45.0).abs() < 1e-12);
/// ```
pub const PRINT_ANGLE: f64 = FRAC_PI_4;

/// Radial overlap between axle and socket on each side, in mm.
pub const AXLE_OVERLAP: f64 = 0.3;

/// Largest radius a printer can bridge without support, in mm.
pub const BRIDGEABLE_RADIUS: f64 = 1.5;

/// Nominal gap between the axle and the socket roof, in mm.
pub const SOCKET_V_CLEARANCE: f64 = 0.6;

/// Upper bound on the gap between the axle and the socket roof, in mm.
pub const SOCKET_V_CLEARANCE_MAX: f64 = 2.0;

/// Lower bound of the arm half width, in mm.
pub const MIN_HALF_ARM_WIDTH: f64 = 0.6;

/// Lower bound of the socket wall width, in mm.
pub const MIN_WALL_WIDTH: f64 = 0.8;

/// Lower bound of the radius at the axle tips, in mm.
pub const MIN_AXLE_TIP_RADIUS: f64 = 0.4;

/// Minimum width of the straight axle section beyond the arm, in mm.
///
/// Keeps the sheared middle rings from collapsing onto the shoulder rings.
pub const AXLE_STRAIGHT_MARGIN: f64 = 1.0e-4;

/// Smallest complement angle used when a bending limit reaches the print
/// angle (1°).
///
/// # Examples
/// ```
/// use config::constants::MIN_COMPLEMENT_ANGLE;
/// assert!((MIN_COMPLEMENT_ANGLE.to_degrees() - 1.0).abs() < 1e-12);
/// ```
pub const MIN_COMPLEMENT_ANGLE: f64 = PI / 180.0;

/// Divisor applied to the clearance to extend mirrored arm spaces just past
/// the shared separator.
pub const ARM_SPACE_OVERSHOOT_DIVISOR: f64 = 100.0;

// =============================================================================
// INPUT BOUNDS
// =============================================================================

/// Smallest socket diameter accepted, in mm.
pub const MIN_SIZE: f64 = 2.8;

/// Smallest print clearance accepted, in mm.
pub const MIN_CLEARANCE: f64 = 0.1;

/// Largest bending angle (up, down or horizontal) accepted.
pub const MAX_BEND_ANGLE: f64 = FRAC_PI_4;

/// Smallest number of vertices per circular loop.
///
/// # Examples
/// ```
/// use config::constants::MIN_RESOLUTION;
/// assert_eq!(MIN_RESOLUTION % 2, 0);
/// ```
pub const MIN_RESOLUTION: u32 = 8;

/// Slack allowed when comparing user angles against their bounds, absorbing
/// degree/radian round-off.
pub const ANGLE_TOLERANCE: f64 = 1.0e-9;

// =============================================================================
// DEFAULT REQUEST
// =============================================================================

/// Default socket diameter, in mm.
pub const DEFAULT_SIZE: f64 = 4.0;

/// Default upward bending angle (22.5°).
pub const DEFAULT_UP_ANGLE: f64 = FRAC_PI_8;

/// Default downward bending angle (22.5°).
pub const DEFAULT_DOWN_ANGLE: f64 = FRAC_PI_8;

/// Default horizontal bending limit (45°).
pub const DEFAULT_HORIZONTAL_ANGLE: f64 = FRAC_PI_4;

/// Default print clearance between moving parts, in mm.
///
/// Generous, but about the minimum recommended for FDM printers.
pub const DEFAULT_CLEARANCE: f64 = 0.3;

/// Default number of vertices per circular loop.
pub const DEFAULT_RESOLUTION: u32 = 64;

// =============================================================================
// SOLVER TOLERANCES
// =============================================================================

/// Plane-side classification tolerance of the BSP boolean solver.
///
/// # Examples
/// ```
/// use config::constants::BSP_EPSILON;
/// assert!(BSP_EPSILON < 1.0e-3);
/// ```
pub const BSP_EPSILON: f64 = 1.0e-5;

/// Grid size used to weld solver output vertices back together.
pub const WELD_EPSILON: f64 = 1.0e-5;

/// Distance within which a boolean's output vertex is taken to lie on a
/// neighbouring open edge and is inserted into it.
///
/// Covers the weld shift plus the solver's on-plane slack.
pub const TJUNCTION_EPSILON: f64 = 1.0e-4;

/// Distance under which post-boolean geometry is considered degenerate.
pub const CLEANUP_THRESHOLD: f64 = 1.0e-3;

/// Immutable snapshot of the tolerances the CSG sink runs with.
///
/// # Examples
/// ```
/// use config::constants::CsgConfig;
/// let config = CsgConfig::default();
/// assert!(config.tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsgConfig {
    /// Plane classification tolerance for the BSP solver.
    pub tolerance: f64,
    /// Distance threshold of the degenerate-geometry cleanup pass.
    pub cleanup_threshold: f64,
}

impl CsgConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// tolerances.
    ///
    /// # Examples
    /// ```
    /// use config::constants::CsgConfig;
    /// let cfg = CsgConfig::new(1.0e-6, 1.0e-3).expect("valid config");
    /// assert_eq!(cfg.cleanup_threshold, 1.0e-3);
    /// ```
    pub fn new(tolerance: f64, cleanup_threshold: f64) -> Result<Self, ConfigError> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if !(cleanup_threshold >= tolerance && cleanup_threshold.is_finite()) {
            return Err(ConfigError::InvalidCleanupThreshold(cleanup_threshold));
        }
        Ok(Self {
            tolerance,
            cleanup_threshold,
        })
    }
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            tolerance: BSP_EPSILON,
            cleanup_threshold: CLEANUP_THRESHOLD,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the solver tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
    /// Raised when the cleanup threshold is below the solver tolerance.
    InvalidCleanupThreshold(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive: {value}")
            }
            ConfigError::InvalidCleanupThreshold(value) => {
                write!(f, "cleanup_threshold must be >= tolerance: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
