//! # Axle
//!
//! Double-cone axle along X. The two rings at the arm's sides are pulled
//! down on their lower half so the underside of the axle meets the arm at
//! the print angle.

use config::constants::AXLE_STRAIGHT_MARGIN;
use joint_mesh::Mesh;

use crate::params::ParameterSet;
use crate::profile::{Axis, ProfileBuilder};

/// Builds the axle from six X loops: tip, straight start, arm side, arm
/// side, straight end, tip.
pub fn axle(params: &ParameterSet) -> Mesh {
    let haw = params.half_arm_width;
    let straight_x = straight_half_width(params);
    let shear = straight_x - haw;

    let mut profile = ProfileBuilder::new(params.resolution);
    profile.loop_around(Axis::X, params.axle_min_r, -params.axle_x);
    profile.cap_last_loop(false);
    profile.loop_around(Axis::X, params.axle_r, -straight_x);
    profile.bridge_last_loop(false);

    profile.loop_around(Axis::X, params.axle_r, -haw);
    profile.bridge_last_loop(false);
    shear_lower_half(&mut profile, shear);

    profile.loop_around(Axis::X, params.axle_r, haw);
    profile.bridge_last_loop(false);
    shear_lower_half(&mut profile, shear);

    profile.loop_around(Axis::X, params.axle_r, straight_x);
    profile.bridge_last_loop(false);
    profile.loop_around(Axis::X, params.axle_min_r, params.axle_x);
    profile.bridge_last_loop(false);
    profile.cap_last_loop(true);
    profile.finish()
}

/// Half width of the straight section, at least a hair wider than the arm.
pub fn straight_half_width(params: &ParameterSet) -> f64 {
    let straight_x = params.axle_x - (params.axle_r - params.axle_min_r);
    straight_x.max(params.half_arm_width + AXLE_STRAIGHT_MARGIN)
}

/// Lowers every vertex of the last loop that lies below the axis.
fn shear_lower_half(profile: &mut ProfileBuilder, shear: f64) {
    let end = profile.vertex_count();
    for index in end - profile.resolution()..end {
        let mut v = profile.vertex(index);
        if v.z < 0.0 {
            v.z -= shear;
            profile.set_vertex(index, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JointInputs;
    use approx::assert_relative_eq;

    fn params() -> ParameterSet {
        ParameterSet::derive(&JointInputs {
            resolution: 16,
            ..JointInputs::default()
        })
        .unwrap()
    }

    #[test]
    fn test_axle_counts() {
        let mesh = axle(&params());
        assert_eq!(mesh.vertex_count(), 6 * 16);
        assert_eq!(mesh.face_count(), 5 * 16 + 2);
    }

    #[test]
    fn test_straight_section_clears_arm() {
        let p = params();
        assert!(straight_half_width(&p) > p.half_arm_width);
    }

    #[test]
    fn test_axle_spans_reach_along_x() {
        let p = params();
        let (min, max) = axle(&p).bounding_box();
        assert_relative_eq!(min.x, -p.axle_x, epsilon = 1e-12);
        assert_relative_eq!(max.x, p.axle_x, epsilon = 1e-12);
        assert_relative_eq!(max.z, p.axle_r, epsilon = 1e-12);
        assert!(min.z < -p.axle_r);
    }

    #[test]
    fn test_only_lower_half_is_sheared() {
        let p = params();
        let mesh = axle(&p);
        let shear = straight_half_width(&p) - p.half_arm_width;
        // Third loop sits at -half_arm_width; vertex 0 is on top, 8 at the bottom.
        let top = mesh.vertex(2 * 16);
        let bottom = mesh.vertex(2 * 16 + 8);
        assert_relative_eq!(top.z, p.axle_r, epsilon = 1e-12);
        assert_relative_eq!(bottom.z, -p.axle_r - shear, epsilon = 1e-12);
    }
}
