//! # Separator
//!
//! A cylinder along +Y whose near end is hollowed into a cone with a
//! spherical bottom. The cone's half angles differ above, below and to the
//! sides, so when the separator is subtracted it leaves walls that stop the
//! arm at the requested bending limits.
//!
//! ```text
//!   cap (y = 4R) ── cylinder ── blended ring ── cone ── sphere rings ── tip (y = T)
//! ```
//!
//! Every loop is two halves of `resolution / 2` vertices: the upper half
//! runs from -X over +Z to +X, the lower half back under -Z.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;
use joint_mesh::Mesh;
use serde::{Deserialize, Serialize};

use crate::profile::ProfileBuilder;

/// Dimensions of one separator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparatorSpec {
    /// Distance from the origin to the cone tip along Y.
    pub tip_y: f64,
    /// Outer cylinder radius.
    pub xz_radius: f64,
    /// Sideways cone half angle.
    pub h_angle: f64,
    pub up_angle: f64,
    pub down_angle: f64,
}

/// Where each cone half angle meets the sphere of radius `tip_y`.
#[derive(Debug, Clone, Copy)]
struct ConeLimits {
    up_r: f64,
    up_y: f64,
    h_r: f64,
    h_y: f64,
    down_r: f64,
    down_y: f64,
}

impl ConeLimits {
    fn new(spec: &SeparatorSpec) -> Self {
        let (up_sin, up_cos) = spec.up_angle.sin_cos();
        let (h_sin, h_cos) = spec.h_angle.sin_cos();
        let (down_sin, down_cos) = spec.down_angle.sin_cos();
        Self {
            up_r: spec.tip_y * up_sin,
            up_y: spec.tip_y * up_cos,
            h_r: spec.tip_y * h_sin,
            h_y: spec.tip_y * h_cos,
            down_r: spec.tip_y * down_sin,
            down_y: spec.tip_y * down_cos,
        }
    }
}

pub fn separator(spec: &SeparatorSpec, resolution: u32) -> Mesh {
    let tip = spec.tip_y;
    let radius = spec.xz_radius;
    let limits = ConeLimits::new(spec);
    let half = resolution / 2;

    let mut profile = ProfileBuilder::new(resolution);
    let step = profile.angle_step();

    // Far end of the cylinder
    profile.custom_loop(|i| {
        let (sin, cos) = (i as f64 * step).sin_cos();
        DVec3::new(-radius * cos, 4.0 * radius, radius * sin)
    });
    profile.cap_last_loop(false);

    // Where the cone meets the cylinder
    profile.custom_loop(|i| {
        if i < half {
            let a = i as f64 * step;
            let (x, y, z) =
                cylinder_point(spec, &limits, a, spec.up_angle, limits.up_r, limits.up_y);
            DVec3::new(-x, y, z)
        } else {
            let a = (i - half) as f64 * step;
            let (x, y, z) =
                cylinder_point(spec, &limits, a, spec.down_angle, limits.down_r, limits.down_y);
            DVec3::new(x, y, -z)
        }
    });
    profile.bridge_last_loop(false);

    // Where the cone meets the sphere, then progressively smaller rings
    let h_max = (limits.h_r / tip).asin().max(0.001);
    let up_max = (limits.up_r / tip).asin();
    let down_max = (limits.down_r / tip).asin();
    sphere_ring(&mut profile, tip, h_max, up_max, down_max);
    profile.bridge_last_loop(false);

    let num_rings = (h_max.max(up_max).max(down_max) / step).floor() as u32;
    for i in (1..num_rings).rev() {
        let scale = i as f64 / num_rings as f64;
        sphere_ring(&mut profile, tip, h_max * scale, up_max * scale, down_max * scale);
        profile.bridge_last_loop(false);
    }

    profile.push_vertex(DVec3::new(0.0, tip, 0.0));
    profile.bridge_to_point(true);
    profile.finish()
}

/// Point on the cylinder at angle `a` from -X, blending the vertical cone
/// (half angle `v_angle`) with the sideways one.
///
/// Returns `(x, y, z)` for the upper half; callers mirror it for the lower.
fn cylinder_point(
    spec: &SeparatorSpec,
    limits: &ConeLimits,
    a: f64,
    v_angle: f64,
    v_r: f64,
    v_y: f64,
) -> (f64, f64, f64) {
    let tip = spec.tip_y;
    let (sin, cos) = a.sin_cos();
    let x = spec.xz_radius * cos;
    let z = spec.xz_radius * sin;

    let y_v = if z < v_r {
        (tip * tip - z * z).max(0.0).sqrt()
    } else {
        v_y - (z - v_r) * v_angle.tan()
    };
    let y_h = if x.abs() < limits.h_r {
        (tip * tip - x * x).max(0.0).sqrt()
    } else {
        limits.h_y - (x.abs() - limits.h_r) * spec.h_angle.tan()
    };

    let y = tip - (tip - y_h) * cos.abs() - (tip - y_v) * sin;
    (x, y, z)
}

/// Appends a ring on the sphere of radius `tip` bounded by the given
/// sideways, upward and downward angles.
fn sphere_ring(profile: &mut ProfileBuilder, tip: f64, h_max: f64, up_max: f64, down_max: f64) {
    let half = profile.resolution() / 2;
    let a_step = 4.0 * h_max / profile.resolution() as f64;

    profile.custom_loop(|i| {
        let (j, v_max, sign) = if i < half {
            (i, up_max, 1.0)
        } else {
            (i - half, down_max, -1.0)
        };
        let a = -h_max + j as f64 * a_step;
        let b = v_max * (a / h_max * FRAC_PI_2).cos();
        DVec3::new(
            sign * tip * b.cos() * a.sin(),
            tip * b.cos() * a.cos(),
            sign * tip * b.sin(),
        )
    });
}
