//! # Degenerate Geometry Cleanup
//!
//! Repairs the small defects BSP booleans leave behind:
//! - vertices a hair apart that should be one
//! - faces thinner than the threshold
//! - T-junctions where one face's vertex sits on a neighbour's edge
//! - coincident faces of opposite winding
//!
//! [`Mesh::close_t_junctions`] is the light variant run after every boolean:
//! it moves no vertex and drops no face with area.

use std::collections::HashMap;

use glam::DVec3;
use tracing::{debug, trace};

use crate::weld::VertexWelder;
use crate::Mesh;

/// Upper bound on T-junction passes; each pass can expose new junctions.
const MAX_SPLIT_PASSES: usize = 8;

/// Counts of what a cleanup pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Vertices merged into a neighbour within the threshold.
    pub welded_vertices: usize,
    /// Faces removed for collapsing below the threshold or cancelling an
    /// opposite twin.
    pub removed_faces: usize,
    /// Vertices inserted into edges to close T-junctions.
    pub split_edges: usize,
    /// Vertices no longer referenced by any face.
    pub removed_vertices: usize,
}

impl Mesh {
    /// Dissolves geometry smaller than `threshold`.
    ///
    /// Welds vertices closer than `threshold`, drops faces thinner than it
    /// and cancels coincident opposite faces. Vertices lying on open edges
    /// are then inserted into those edges, and unreferenced vertices are
    /// removed.
    pub fn dissolve_degenerate(&mut self, threshold: f64) -> CleanupStats {
        let mut stats = CleanupStats::default();
        let (vertices, faces) = std::mem::take(self).into_parts();

        let mut welder = VertexWelder::new(threshold);
        let remap: Vec<u32> = vertices.iter().map(|v| welder.insert(*v)).collect();
        let positions = welder.into_positions();
        stats.welded_vertices = vertices.len() - positions.len();

        let mut kept = Vec::with_capacity(faces.len());
        for face in faces {
            let ring = collapse_repeats(face.iter().map(|&i| remap[i as usize]));
            if ring.len() < 3 || is_sliver(&positions, &ring, threshold) {
                stats.removed_faces += 1;
                continue;
            }
            kept.push(ring);
        }

        stats.removed_faces += cancel_opposite_faces(&mut kept);
        stats.split_edges = split_t_junctions(&positions, &mut kept, threshold);

        let (positions, kept, unused) = compact(positions, kept);
        stats.removed_vertices = unused;

        debug!(
            threshold,
            welded = stats.welded_vertices,
            removed_faces = stats.removed_faces,
            split_edges = stats.split_edges,
            removed_vertices = stats.removed_vertices,
            "dissolved degenerate geometry"
        );

        *self = Mesh::from_parts(positions, kept);
        stats
    }

    /// Closes the T-junction gaps a boolean leaves between split faces.
    ///
    /// Vertices within `threshold` of an open edge are inserted into it.
    /// Repeated indices collapse and opposite twin faces cancel, but no
    /// vertex moves. Returns the number of insertions.
    pub fn close_t_junctions(&mut self, threshold: f64) -> usize {
        let (positions, faces) = std::mem::take(self).into_parts();
        let mut faces: Vec<Vec<u32>> = faces
            .into_iter()
            .map(|face| collapse_repeats(face.into_iter()))
            .filter(|face| face.len() >= 3)
            .collect();

        let cancelled = cancel_opposite_faces(&mut faces);
        let split = split_t_junctions(&positions, &mut faces, threshold);
        if cancelled + split > 0 {
            trace!(cancelled, split, "closed t-junctions");
        }

        *self = if cancelled > 0 {
            let (positions, faces, _) = compact(positions, faces);
            Mesh::from_parts(positions, faces)
        } else {
            Mesh::from_parts(positions, faces)
        };
        split
    }
}

/// Drops consecutive repeated indices, including across the wrap.
fn collapse_repeats(indices: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut ring: Vec<u32> = Vec::new();
    for i in indices {
        if ring.last() != Some(&i) {
            ring.push(i);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// True when the face is narrower than `threshold` across its longest edge.
fn is_sliver(positions: &[DVec3], ring: &[u32], threshold: f64) -> bool {
    let mut normal = DVec3::ZERO;
    let mut longest: f64 = 0.0;
    for (i, &a) in ring.iter().enumerate() {
        let p = positions[a as usize];
        let q = positions[ring[(i + 1) % ring.len()] as usize];
        normal += p.cross(q);
        longest = longest.max(p.distance(q));
    }

    let area = normal.length() * 0.5;
    longest < threshold || 2.0 * area / longest < threshold
}

/// Removes pairs of identical faces wound in opposite directions.
///
/// Such pairs enclose no volume; they are the zero-thickness walls left
/// where two solids touched.
fn cancel_opposite_faces(faces: &mut Vec<Vec<u32>>) -> usize {
    let mut unmatched: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
    let mut dropped = vec![false; faces.len()];

    for (i, face) in faces.iter().enumerate() {
        let reversed = canonical_ring(face.iter().rev().copied());
        if let Some(twin) = unmatched.get_mut(&reversed).and_then(Vec::pop) {
            dropped[twin] = true;
            dropped[i] = true;
            continue;
        }
        unmatched
            .entry(canonical_ring(face.iter().copied()))
            .or_default()
            .push(i);
    }

    let count = dropped.iter().filter(|&&d| d).count();
    if count > 0 {
        let mut index = 0;
        faces.retain(|_| {
            let keep = !dropped[index];
            index += 1;
            keep
        });
    }
    count
}

/// Rotates a ring so it starts at its smallest index.
fn canonical_ring(indices: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut ring: Vec<u32> = indices.collect();
    if let Some(start) = (0..ring.len()).min_by_key(|&i| ring[i]) {
        ring.rotate_left(start);
    }
    ring
}

/// Counts every directed edge over all faces.
fn directed_edge_counts(faces: &[Vec<u32>]) -> HashMap<(u32, u32), usize> {
    let mut counts = HashMap::new();
    for (a, b) in faces.iter().flat_map(|face| ring_edges(face)) {
        *counts.entry((a, b)).or_insert(0) += 1;
    }
    counts
}

/// Inserts vertices that lie on open edges into those edges.
///
/// An edge is open when it is used more often than its reverse. Only
/// endpoints of open edges can close a T-junction, so they are the only
/// candidates searched.
///
/// Returns the number of insertions.
fn split_t_junctions(positions: &[DVec3], faces: &mut [Vec<u32>], threshold: f64) -> usize {
    let mut total = 0;

    for _ in 0..MAX_SPLIT_PASSES {
        let directed = directed_edge_counts(faces);
        let count = |a: u32, b: u32| directed.get(&(a, b)).copied().unwrap_or(0);
        let is_open = |a: u32, b: u32| count(b, a) < count(a, b);

        let mut candidates: Vec<u32> = directed
            .keys()
            .filter(|&&(a, b)| is_open(a, b))
            .flat_map(|&(a, b)| [a, b])
            .collect();
        if candidates.is_empty() {
            break;
        }
        candidates.sort_unstable();
        candidates.dedup();
        let sweep = SweepIndex::new(positions, &candidates);

        let mut inserted = 0;
        for face in faces.iter_mut() {
            let mut rebuilt = Vec::with_capacity(face.len());
            let mut added: Vec<u32> = Vec::new();

            for (a, b) in ring_edges(face) {
                rebuilt.push(a);
                if !is_open(a, b) {
                    continue;
                }

                let (pa, pb) = (positions[a as usize], positions[b as usize]);
                let mut on_edge: Vec<(f64, u32)> = sweep
                    .near_segment(pa, pb, threshold)
                    .filter(|c| !face.contains(c) && !added.contains(c))
                    .filter_map(|c| {
                        edge_parameter(pa, pb, positions[c as usize], threshold).map(|t| (t, c))
                    })
                    .collect();
                on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));

                for (_, c) in on_edge {
                    rebuilt.push(c);
                    added.push(c);
                }
            }

            if !added.is_empty() {
                inserted += added.len();
                *face = rebuilt;
            }
        }

        if inserted == 0 {
            break;
        }
        total += inserted;
    }

    total
}

/// Candidate vertices sorted along X for range queries.
struct SweepIndex {
    sorted: Vec<(f64, u32)>,
}

impl SweepIndex {
    fn new(positions: &[DVec3], candidates: &[u32]) -> Self {
        let mut sorted: Vec<(f64, u32)> = candidates
            .iter()
            .map(|&c| (positions[c as usize].x, c))
            .collect();
        sorted.sort_by(|p, q| p.0.total_cmp(&q.0));
        Self { sorted }
    }

    /// Candidates whose X lies within `margin` of the segment's X extent.
    fn near_segment(&self, a: DVec3, b: DVec3, margin: f64) -> impl Iterator<Item = u32> + '_ {
        let (lo, hi) = (a.x.min(b.x) - margin, a.x.max(b.x) + margin);
        let start = self.sorted.partition_point(|&(x, _)| x < lo);
        self.sorted[start..]
            .iter()
            .take_while(move |&&(x, _)| x <= hi)
            .map(|&(_, c)| c)
    }
}

fn ring_edges(face: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    face.iter()
        .enumerate()
        .map(move |(i, &a)| (a, face[(i + 1) % face.len()]))
}

/// Parameter of `p` along segment `a`→`b` if it lies strictly inside the
/// segment and within `threshold` of it.
fn edge_parameter(a: DVec3, b: DVec3, p: DVec3, threshold: f64) -> Option<f64> {
    let d = b - a;
    let len2 = d.length_squared();
    if len2 <= threshold * threshold {
        return None;
    }

    let t = (p - a).dot(d) / len2;
    if t <= 0.0 || t >= 1.0 {
        return None;
    }
    ((a + d * t).distance(p) < threshold).then_some(t)
}

/// Removes unreferenced vertices, returning the compacted mesh parts and
/// how many vertices were dropped.
fn compact(positions: Vec<DVec3>, faces: Vec<Vec<u32>>) -> (Vec<DVec3>, Vec<Vec<u32>>, usize) {
    let mut remap = vec![u32::MAX; positions.len()];
    let mut compacted = Vec::with_capacity(positions.len());

    let faces: Vec<Vec<u32>> = faces
        .into_iter()
        .map(|face| {
            face.into_iter()
                .map(|i| {
                    let slot = &mut remap[i as usize];
                    if *slot == u32::MAX {
                        *slot = compacted.len() as u32;
                        compacted.push(positions[i as usize]);
                    }
                    *slot
                })
                .collect()
        })
        .collect();

    let unused = positions.len() - compacted.len();
    (compacted, faces, unused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube_soup(jitter: f64) -> Mesh {
        let corners = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        ];
        let quads = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ];

        // Every face gets private, slightly offset copies of its corners.
        let mut mesh = Mesh::new();
        for (f, quad) in quads.iter().enumerate() {
            let offset = DVec3::splat(jitter * f as f64);
            let face = quad
                .iter()
                .map(|&c| mesh.add_vertex(corners[c] + offset))
                .collect();
            mesh.add_face(face);
        }
        mesh
    }

    #[test]
    fn test_welds_face_soup_into_closed_cube() {
        let mut mesh = unit_cube_soup(1e-5);
        assert!(!mesh.is_manifold());

        let stats = mesh.dissolve_degenerate(1e-3);
        assert_eq!(stats.welded_vertices, 16);
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_removes_collapsed_and_thin_faces() {
        let mut mesh = unit_cube_soup(0.0);
        let a = mesh.add_vertex(DVec3::new(5.0, 0.0, 0.0));
        let b = mesh.add_vertex(DVec3::new(6.0, 0.0, 0.0));
        let c = mesh.add_vertex(DVec3::new(5.5, 1e-5, 0.0));
        mesh.add_face(vec![a, b, c]);
        mesh.add_face(vec![a, a, b]);

        let stats = mesh.dissolve_degenerate(1e-3);
        assert_eq!(stats.removed_faces, 2);
        assert_eq!(stats.removed_vertices, 3);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.is_manifold());
    }

    /// Unit cube whose top face is split in two along x = 0.5. The side
    /// faces do not know about the split.
    fn cube_with_split_top() -> Mesh {
        let mut mesh = Mesh::new();
        for p in [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
            (0.5, 0.0, 1.0),
            (0.5, 1.0, 1.0),
        ] {
            mesh.add_vertex(DVec3::new(p.0, p.1, p.2));
        }
        mesh.add_face(vec![0, 3, 2, 1]);
        mesh.add_face(vec![4, 8, 9, 7]);
        mesh.add_face(vec![8, 5, 6, 9]);
        mesh.add_face(vec![0, 1, 5, 4]);
        mesh.add_face(vec![1, 2, 6, 5]);
        mesh.add_face(vec![2, 3, 7, 6]);
        mesh.add_face(vec![3, 0, 4, 7]);
        mesh
    }

    #[test]
    fn test_splits_t_junctions() {
        let mut mesh = cube_with_split_top();
        assert_eq!(mesh.edge_report().boundary_edges, 6);

        let stats = mesh.dissolve_degenerate(1e-3);
        assert_eq!(stats.split_edges, 2);
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_close_t_junctions_keeps_vertices() {
        let mut mesh = cube_with_split_top();
        let before: Vec<DVec3> = mesh.vertices().to_vec();

        assert_eq!(mesh.close_t_junctions(1e-4), 2);
        assert!(mesh.is_manifold());
        assert_eq!(mesh.vertices(), before.as_slice());
        assert_eq!(mesh.face_count(), 7);
    }

    #[test]
    fn test_close_t_junctions_ignores_distant_vertices() {
        let mut mesh = cube_with_split_top();
        // Lift the split off the top face so it no longer sits on the side edges.
        mesh.set_vertex(8, DVec3::new(0.5, 0.0, 1.01));
        mesh.set_vertex(9, DVec3::new(0.5, 1.0, 1.01));

        assert_eq!(mesh.close_t_junctions(1e-4), 0);
        assert!(!mesh.is_manifold());
    }

    #[test]
    fn test_cancels_opposite_twin_faces() {
        let mut mesh = unit_cube_soup(0.0);
        mesh.dissolve_degenerate(1e-3);
        let wall = vec![0, 2, 6, 4];
        let mut reversed = wall.clone();
        reversed.reverse();
        mesh.add_face(wall);
        mesh.add_face(reversed);
        assert!(!mesh.is_manifold());

        assert_eq!(mesh.close_t_junctions(1e-4), 0);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sweep_only_yields_candidates_in_edge_range() {
        let positions: Vec<DVec3> = (0..10).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
        let candidates: Vec<u32> = (0..10).rev().collect();
        let sweep = SweepIndex::new(&positions, &candidates);

        let near: Vec<u32> = sweep
            .near_segment(DVec3::new(5.0, 1.0, 0.0), DVec3::new(2.5, -1.0, 0.0), 0.1)
            .collect();
        assert_eq!(near, vec![3, 4, 5]);
    }

    #[test]
    fn test_clean_mesh_is_untouched() {
        let mut mesh = unit_cube_soup(0.0);
        mesh.dissolve_degenerate(1e-3);
        let before = mesh.clone();
        assert_eq!(mesh.dissolve_degenerate(1e-3), CleanupStats::default());
        assert_eq!(mesh, before);
    }
}
