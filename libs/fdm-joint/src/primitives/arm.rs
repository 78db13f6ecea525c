//! # Arm
//!
//! Slab connecting the axle to the far part. Its underside runs down at the
//! print angle from just behind the axle.

use config::constants::PRINT_ANGLE;
use glam::DVec3;
use joint_mesh::Mesh;

use crate::params::ParameterSet;

pub fn arm(params: &ParameterSet) -> Mesh {
    let x = params.half_arm_width;
    let top = params.axle_min_r;
    let length = params.arm_length;

    let start_z = params.axle_r * PRINT_ANGLE.cos() + params.axle_x
        - params.half_arm_width
        - (params.axle_r - params.axle_min_r);
    let start_y = params.axle_r * PRINT_ANGLE.sin();
    let drop = length + start_y;

    let vertices = vec![
        DVec3::new(-x, 0.0, top),
        DVec3::new(x, 0.0, top),
        DVec3::new(-x, length, top),
        DVec3::new(x, length, top),
        DVec3::new(-x, -start_y, -start_z),
        DVec3::new(x, -start_y, -start_z),
        DVec3::new(-x, -start_y + drop, -start_z - drop),
        DVec3::new(x, -start_y + drop, -start_z - drop),
    ];
    let faces = vec![
        vec![0, 1, 3, 2],
        vec![4, 5, 1, 0],
        vec![6, 7, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 2, 6, 4],
        vec![5, 7, 3, 1],
    ];
    Mesh::from_parts(vertices, faces)
}
