//! # Socket
//!
//! Solid of revolution around Z that the axle sits in once subtracted.

use config::constants::{BRIDGEABLE_RADIUS, SOCKET_V_CLEARANCE, SOCKET_V_CLEARANCE_MAX};
use glam::DVec3;
use joint_mesh::Mesh;

use crate::params::ParameterSet;
use crate::profile::{Axis, ProfileBuilder};

/// Builds the socket: bottom point, two waist loops and a capped top loop.
pub fn socket(params: &ParameterSet) -> Mesh {
    let half = params.size / 2.0;
    let waist = params.axle_min_r;

    let mut profile = ProfileBuilder::new(params.resolution);
    profile.push_vertex(DVec3::new(0.0, 0.0, -waist - half));
    profile.loop_around(Axis::Z, half, -waist);
    profile.bridge_to_point(false);
    profile.loop_around(Axis::Z, half, waist);
    profile.bridge_last_loop(false);

    let (top, top_r) = socket_top(params);
    profile.loop_around(Axis::Z, top_r, top);
    profile.bridge_last_loop(false);
    profile.cap_last_loop(true);
    profile.finish()
}

/// Height and radius of the socket roof.
///
/// The roof sits `SOCKET_V_CLEARANCE` above the axle with a 45° slope down
/// to the waist. When its radius exceeds what prints without support, the
/// roof is raised until the radius shrinks to `BRIDGEABLE_RADIUS`, but never
/// more than `SOCKET_V_CLEARANCE_MAX` above the axle.
pub fn socket_top(params: &ParameterSet) -> (f64, f64) {
    let half = params.size / 2.0;
    let radius_at = |top: f64| half - (top - params.axle_min_r);

    let top = params.axle_r + SOCKET_V_CLEARANCE;
    let top_r = radius_at(top);
    if top_r <= BRIDGEABLE_RADIUS {
        return (top, top_r);
    }

    let excess = top_r - BRIDGEABLE_RADIUS;
    if excess > SOCKET_V_CLEARANCE_MAX {
        let top = params.axle_r + SOCKET_V_CLEARANCE_MAX;
        (top, radius_at(top))
    } else {
        (top + excess, BRIDGEABLE_RADIUS)
    }
}
