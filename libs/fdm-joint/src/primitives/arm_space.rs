//! # Arm Space
//!
//! The body around the arm that gives it room to swing. The front slopes
//! with the down angle, the sides fan out with the bendable angle and the
//! roof rises with the up angle before closing in a 45° ridge.

use config::constants::PRINT_ANGLE;
use glam::DVec3;
use joint_mesh::Mesh;

use crate::params::ParameterSet;

/// Builds the arm space reaching `depth` along Y, or up to the arm end
/// minus clearance when `None`.
pub fn arm_space(params: &ParameterSet, depth: Option<f64>) -> Mesh {
    let c = params.clearance;
    let haw = params.half_arm_width;
    let bend = params.bendable_angle;
    let bottom = params.bottom;
    let slope = params.down_angle - PRINT_ANGLE;

    let mut mesh = Mesh::with_capacity(14, 14);

    // Front edge on the swept circle
    let r = params.axle_major_r + c;
    let y = -r * slope.cos();
    let x = haw + c - y * bend.sin();
    let front_y = y * bend.cos();
    let front_z = r * slope.sin();
    mesh.add_vertex(DVec3::new(-x, front_y, front_z));
    mesh.add_vertex(DVec3::new(x, front_y, front_z));

    // Front edge on the floor
    let h = bottom + front_z;
    let foot_y = front_y - h * slope.tan();
    let x = haw + c + (foot_y * bend.sin()).abs();
    mesh.add_vertex(DVec3::new(-x, foot_y, -bottom));
    mesh.add_vertex(DVec3::new(x, foot_y, -bottom));
    mesh.add_face(vec![2, 3, 1, 0]);

    if foot_y < 0.0 {
        close_floor_under_axle(&mut mesh, params);
    }

    // Arm root under the axle
    let x = haw + c;
    mesh.add_vertex(DVec3::new(-x, 0.0, params.axle_min_r));
    mesh.add_vertex(DVec3::new(x, 0.0, params.axle_min_r));
    let l = mesh.vertex_count() as u32 - 1;
    mesh.add_face(vec![0, 1, l, l - 1]);
    mesh.add_face(vec![0, l - 1, l - 3]);
    mesh.add_face(vec![1, l - 2, l]);

    // Far end
    let y = depth.unwrap_or(params.arm_length - c);
    let x = (y * bend.tan() + haw).max(haw + c);
    let far_top = params.axle_min_r + y * params.up_angle.tan();
    mesh.add_vertex(DVec3::new(-x, y, far_top));
    mesh.add_vertex(DVec3::new(x, y, far_top));
    mesh.add_vertex(DVec3::new(-x, y, -bottom));
    mesh.add_vertex(DVec3::new(x, y, -bottom));
    mesh.add_face(vec![l - 1, l + 1, l + 3, l - 3]);
    mesh.add_face(vec![l - 2, l + 4, l + 2, l]);
    mesh.add_face(vec![l - 3, l + 3, l + 4, l - 2]);

    // Roof ridge
    let ridge = PRINT_ANGLE.tan();
    mesh.add_vertex(DVec3::new(0.0, 0.0, params.axle_min_r + (c + haw) * ridge));
    mesh.add_vertex(DVec3::new(0.0, y, far_top + x * ridge));
    mesh.add_face(vec![l - 1, l, l + 5]);
    mesh.add_face(vec![l + 1, l - 1, l + 5, l + 6]);
    mesh.add_face(vec![l, l + 2, l + 6, l + 5]);
    mesh.add_face(vec![l + 1, l + 6, l + 2, l + 4, l + 3]);

    mesh
}

/// Extends the floor back to the arm plane when the front foot lands in
/// front of the axle.
fn close_floor_under_axle(mesh: &mut Mesh, params: &ParameterSet) {
    let x = params.half_arm_width + params.clearance;
    mesh.add_vertex(DVec3::new(-x, 0.0, -params.bottom));
    mesh.add_vertex(DVec3::new(x, 0.0, -params.bottom));
    mesh.add_face(vec![0, 4, 2]);
    mesh.add_face(vec![1, 3, 5]);
    mesh.add_face(vec![3, 2, 4, 5]);
}
