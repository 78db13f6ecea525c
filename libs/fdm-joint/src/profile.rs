//! # Profile Builder
//!
//! Circular vertex loops and the faces that stitch them together.
//!
//! Loops are appended strictly in order and each new loop is bridged to the
//! one right before it, so every index is found by arithmetic from the end
//! of the vertex list:
//!
//! ```text
//! ... | previous loop (n) | last loop (n) |
//!       p                   l               len
//! ```

use glam::DVec3;
use joint_mesh::Mesh;
use std::f64::consts::TAU;

/// Axis a circular loop is wound around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Incremental builder for solids made of stacked loops.
///
/// # Example
///
/// ```rust
/// use fdm_joint::profile::{Axis, ProfileBuilder};
///
/// // A closed 8-sided prism along Z
/// let mut profile = ProfileBuilder::new(8);
/// profile.loop_around(Axis::Z, 1.0, 0.0);
/// profile.cap_last_loop(false);
/// profile.loop_around(Axis::Z, 1.0, 2.0);
/// profile.bridge_last_loop(false);
/// profile.cap_last_loop(true);
/// let mesh = profile.finish();
/// assert!(mesh.is_manifold());
/// ```
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    mesh: Mesh,
    resolution: u32,
    angle_step: f64,
}

impl ProfileBuilder {
    /// Creates an empty builder emitting `resolution` vertices per loop.
    pub fn new(resolution: u32) -> Self {
        Self {
            mesh: Mesh::new(),
            resolution,
            angle_step: TAU / resolution as f64,
        }
    }

    /// Vertices per loop.
    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Angle between consecutive loop vertices.
    #[inline]
    pub fn angle_step(&self) -> f64 {
        self.angle_step
    }

    /// Number of vertices appended so far.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count() as u32
    }

    /// Appends a single vertex, returning its index.
    pub fn push_vertex(&mut self, position: DVec3) -> u32 {
        self.mesh.add_vertex(position)
    }

    /// Appends an explicit face.
    pub fn add_face(&mut self, indices: Vec<u32>) {
        self.mesh.add_face(indices);
    }

    /// Overwrites a vertex already in the builder.
    pub fn set_vertex(&mut self, index: u32, position: DVec3) {
        self.mesh.set_vertex(index, position);
    }

    /// Returns a vertex already in the builder.
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.mesh.vertex(index)
    }

    /// Appends a circular loop of `radius` around `axis` at `offset` along it.
    pub fn loop_around(&mut self, axis: Axis, radius: f64, offset: f64) {
        self.loop_scaled(axis, radius, offset, 1.0);
    }

    /// Appends an elliptical loop whose cosine coordinate is scaled by
    /// `y_scale`.
    ///
    /// Vertex `i` sits at angle `i·2π/resolution`:
    /// - X: `(offset, r·sin, r·cos·y_scale)`
    /// - Y: `(r·sin, offset, r·cos·y_scale)`
    /// - Z: `(r·sin, r·cos·y_scale, offset)`
    pub fn loop_scaled(&mut self, axis: Axis, radius: f64, offset: f64, y_scale: f64) {
        for i in 0..self.resolution {
            let (sin, cos) = (i as f64 * self.angle_step).sin_cos();
            let (s, c) = (radius * sin, radius * cos * y_scale);
            let position = match axis {
                Axis::X => DVec3::new(offset, s, c),
                Axis::Y => DVec3::new(s, offset, c),
                Axis::Z => DVec3::new(s, c, offset),
            };
            self.mesh.add_vertex(position);
        }
    }

    /// Appends exactly `resolution` vertices computed by `point(i)`.
    pub fn custom_loop(&mut self, mut point: impl FnMut(u32) -> DVec3) {
        for i in 0..self.resolution {
            self.mesh.add_vertex(point(i));
        }
    }

    /// Index of the first vertex of the last loop.
    fn last_loop_start(&self) -> u32 {
        debug_assert!(self.vertex_count() >= self.resolution, "no loop to bridge");
        self.vertex_count() - self.resolution
    }

    /// Connects the last loop to the loop before it with `resolution` quads.
    ///
    /// Without `reverse` the faces point outward when loops advance
    /// against the loop winding direction.
    pub fn bridge_last_loop(&mut self, reverse: bool) {
        let n = self.resolution;
        let l = self.last_loop_start();
        debug_assert!(l >= n, "bridging needs two loops");
        let p = l - n;

        for j in 0..n {
            let k = (j + 1) % n;
            let face = if reverse {
                vec![l + k, l + j, p + j, p + k]
            } else {
                vec![p + k, p + j, l + j, l + k]
            };
            self.mesh.add_face(face);
        }
    }

    /// Closes the last loop with a triangle fan.
    ///
    /// Without `reverse` the apex is the vertex appended right before the
    /// loop (a base point). With `reverse` the apex is the vertex appended
    /// right after it (a tip).
    pub fn bridge_to_point(&mut self, reverse: bool) {
        let n = self.resolution;
        let len = self.vertex_count();

        if reverse {
            let tip = len - 1;
            let s = tip - n;
            for i in 0..n {
                self.mesh.add_face(vec![tip, s + (i + 1) % n, s + i]);
            }
        } else {
            let s = len - n;
            let apex = s - 1;
            for i in 0..n {
                self.mesh.add_face(vec![apex, s + i, s + (i + 1) % n]);
            }
        }
    }

    /// Closes the last loop with a single polygon.
    pub fn cap_last_loop(&mut self, reverse: bool) {
        let l = self.last_loop_start();
        let mut face: Vec<u32> = (l..l + self.resolution).collect();
        if reverse {
            face.reverse();
        }
        self.mesh.add_face(face);
    }

    /// Consumes the builder and returns the mesh.
    pub fn finish(self) -> Mesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_every_loop_has_resolution_vertices() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let mut profile = ProfileBuilder::new(12);
            profile.loop_around(axis, 1.0, 0.5);
            assert_eq!(profile.vertex_count(), 12);
            profile.loop_scaled(axis, 2.0, -0.5, 0.5);
            assert_eq!(profile.vertex_count(), 24);
            profile.custom_loop(|i| DVec3::splat(i as f64));
            assert_eq!(profile.vertex_count(), 36);
        }
    }

    #[test]
    fn test_loop_coordinates() {
        let mut profile = ProfileBuilder::new(4);
        profile.loop_scaled(Axis::Z, 2.0, 3.0, 0.5);
        let mesh = profile.finish();
        assert!(mesh.vertex(0).abs_diff_eq(DVec3::new(0.0, 1.0, 3.0), 1e-12));
        assert!(mesh.vertex(1).abs_diff_eq(DVec3::new(2.0, 0.0, 3.0), 1e-12));

        let mut profile = ProfileBuilder::new(4);
        profile.loop_around(Axis::X, 1.0, -2.0);
        let mesh = profile.finish();
        assert!(mesh.vertex(0).abs_diff_eq(DVec3::new(-2.0, 0.0, 1.0), 1e-12));
        assert!(mesh.vertex(1).abs_diff_eq(DVec3::new(-2.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_loops_are_bit_identical() {
        let build = || {
            let mut profile = ProfileBuilder::new(64);
            profile.loop_around(Axis::Y, 1.3, 0.7);
            profile.finish()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_two_bridges_have_no_duplicate_edges() {
        let n = 16;
        let mut profile = ProfileBuilder::new(n);
        profile.loop_around(Axis::Z, 1.0, 0.0);
        profile.loop_around(Axis::Z, 1.0, 1.0);
        profile.bridge_last_loop(false);
        profile.loop_around(Axis::Z, 1.0, 2.0);
        profile.bridge_last_loop(false);
        let mesh = profile.finish();

        assert_eq!(mesh.face_count(), 2 * n as usize);
        let mut edges = HashSet::new();
        for face in mesh.faces() {
            for (i, &a) in face.iter().enumerate() {
                assert!(edges.insert((a, face[(i + 1) % face.len()])));
            }
        }
        assert_eq!(mesh.edge_report().non_manifold_edges, 0);
    }

    #[test]
    fn test_fan_and_caps_close_solid() {
        // Cone on a base point, closed at the top
        let mut profile = ProfileBuilder::new(8);
        profile.push_vertex(DVec3::new(0.0, 0.0, -1.0));
        profile.loop_around(Axis::Z, 1.0, 0.0);
        profile.bridge_to_point(false);
        profile.loop_around(Axis::Z, 0.5, 1.0);
        profile.bridge_last_loop(false);
        profile.push_vertex(DVec3::new(0.0, 0.0, 2.0));
        profile.bridge_to_point(true);
        let mesh = profile.finish();

        assert!(mesh.is_manifold());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_reverse_bridge_flips_orientation() {
        let mut forward = ProfileBuilder::new(8);
        forward.loop_around(Axis::Z, 1.0, 0.0);
        forward.cap_last_loop(false);
        forward.loop_around(Axis::Z, 1.0, 1.0);
        forward.bridge_last_loop(false);
        forward.cap_last_loop(true);
        let forward = forward.finish();

        let mut reversed = ProfileBuilder::new(8);
        reversed.loop_around(Axis::Z, 1.0, 0.0);
        reversed.cap_last_loop(true);
        reversed.loop_around(Axis::Z, 1.0, 1.0);
        reversed.bridge_last_loop(true);
        reversed.cap_last_loop(false);
        let reversed = reversed.finish();

        assert!(forward.is_manifold());
        assert!(reversed.is_manifold());
        assert_relative_eq!(forward.signed_volume(), -reversed.signed_volume(), epsilon = 1e-12);
        assert!(forward.signed_volume() > 0.0);
    }
}
