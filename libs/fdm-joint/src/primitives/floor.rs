//! # Floor
//!
//! Box below the joint that flattens its underside for the print bed.

use glam::DVec3;
use joint_mesh::Mesh;

use crate::params::ParameterSet;

/// Builds the floor box. Its top sits one millimetre below where the
/// unraised part will be lifted from, so the finished joint bottoms out at
/// z = -1.
pub fn floor(params: &ParameterSet) -> Mesh {
    let x = params.separator_outer_r;
    let y = 4.0 * params.separator_y + params.clearance;
    let top = -params.raise_z - 1.0;
    let bottom = -params.separator_outer_r - params.clearance;

    let mut vertices = Vec::with_capacity(8);
    for z in [top, bottom] {
        vertices.extend([
            DVec3::new(x, y, z),
            DVec3::new(-x, y, z),
            DVec3::new(-x, -y, z),
            DVec3::new(x, -y, z),
        ]);
    }
    let faces = vec![
        vec![0, 1, 2, 3],
        vec![7, 6, 5, 4],
        vec![1, 0, 4, 5],
        vec![2, 1, 5, 6],
        vec![3, 2, 6, 7],
        vec![0, 3, 7, 4],
    ];
    Mesh::from_parts(vertices, faces)
}
