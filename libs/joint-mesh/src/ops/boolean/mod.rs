//! # Boolean Operations (CSG)
//!
//! Constructive Solid Geometry operations using BSP trees.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! - Union: A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine
//! - Difference: A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine; invert
//! - Intersection: A.invert(); B.clipTo(A); B.invert(); A.clipTo(B); B.clipTo(A); combine; invert
//!
//! Output polygons are welded back into shared vertices and kept as
//! polygons; no triangulation happens on the way out. A fragment split by a
//! plane its neighbour never met leaves a T-junction, so every result has
//! those closed before it is returned.
//!
//! ## Example
//!
//! ```rust
//! use joint_mesh::ops::boolean::{apply, BooleanOp};
//! use joint_mesh::Mesh;
//!
//! let a = Mesh::new();
//! let b = Mesh::new();
//! let result = apply(&a, &b, BooleanOp::Difference).unwrap();
//! assert!(result.is_empty());
//! ```

mod bsp;
mod plane;
mod polygon;

use std::fmt;

use config::constants::{BSP_EPSILON, TJUNCTION_EPSILON, WELD_EPSILON};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::MeshError;
use crate::weld::VertexWelder;
use crate::Mesh;
use bsp::BspTree;
use polygon::Polygon;

// =============================================================================
// OPERATION KIND
// =============================================================================

/// The three set operations on solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    /// Everything inside either operand.
    Union,
    /// Everything inside the first operand but not the second.
    Difference,
    /// Everything inside both operands.
    Intersect,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Difference => "difference",
            BooleanOp::Intersect => "intersect",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Compute union of two meshes.
pub fn union(a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError> {
    apply(a, b, BooleanOp::Union)
}

/// Compute difference of two meshes (A - B).
pub fn difference(a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError> {
    apply(a, b, BooleanOp::Difference)
}

/// Compute intersection of two meshes.
pub fn intersection(a: &Mesh, b: &Mesh) -> Result<Mesh, MeshError> {
    apply(a, b, BooleanOp::Intersect)
}

/// Applies `op` with the default solver tolerance.
pub fn apply(a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh, MeshError> {
    apply_with_tolerance(a, b, op, BSP_EPSILON)
}

/// Applies `op` classifying points within `tolerance` of a plane as on it.
///
/// ## Errors
///
/// Fails if either input is structurally invalid or the result contains
/// non-finite coordinates. Whether the result is closed is left to the
/// caller; see [`Mesh::edge_report`].
pub fn apply_with_tolerance(
    a: &Mesh,
    b: &Mesh,
    op: BooleanOp,
    tolerance: f64,
) -> Result<Mesh, MeshError> {
    a.validate()?;
    b.validate()?;

    if let Some(shortcut) = trivial_result(a, b, op, tolerance) {
        trace!(%op, "boolean resolved without BSP");
        return Ok(shortcut);
    }

    let polys_a = mesh_to_polygons(a, tolerance);
    let polys_b = mesh_to_polygons(b, tolerance);
    let (count_a, count_b) = (polys_a.len(), polys_b.len());

    let mut bsp_a = BspTree::new(polys_a, tolerance);
    let mut bsp_b = BspTree::new(polys_b, tolerance);

    let polygons = match op {
        BooleanOp::Union => {
            bsp_a.clip_to(&bsp_b);
            bsp_b.clip_to(&bsp_a);
            bsp_b.invert();
            bsp_b.clip_to(&bsp_a);
            bsp_b.invert();
            combine(bsp_a, bsp_b)
        }
        BooleanOp::Difference => {
            bsp_a.invert();
            bsp_a.clip_to(&bsp_b);
            bsp_b.clip_to(&bsp_a);
            bsp_b.invert();
            bsp_b.clip_to(&bsp_a);
            bsp_b.invert();
            inverted(combine(bsp_a, bsp_b))
        }
        BooleanOp::Intersect => {
            bsp_a.invert();
            bsp_b.clip_to(&bsp_a);
            bsp_b.invert();
            bsp_a.clip_to(&bsp_b);
            bsp_b.clip_to(&bsp_a);
            inverted(combine(bsp_a, bsp_b))
        }
    };

    let mut result = polygons_to_mesh(&polygons);
    let split = result.close_t_junctions(TJUNCTION_EPSILON.max(tolerance));
    if let Err(err) = result.validate() {
        return Err(MeshError::boolean_failed(format!("{op} produced {err}")));
    }

    debug!(
        %op,
        input_a = count_a,
        input_b = count_b,
        faces = result.face_count(),
        vertices = result.vertex_count(),
        split,
        "boolean complete"
    );
    Ok(result)
}

// =============================================================================
// SHORTCUTS
// =============================================================================

/// Resolves empty operands and disjoint bounding boxes without a BSP.
fn trivial_result(a: &Mesh, b: &Mesh, op: BooleanOp, tolerance: f64) -> Option<Mesh> {
    match (op, a.is_empty(), b.is_empty()) {
        (BooleanOp::Union, true, _) => return Some(b.clone()),
        (BooleanOp::Union, _, true) | (BooleanOp::Difference, false, true) => {
            return Some(a.clone())
        }
        (BooleanOp::Difference, true, _) | (BooleanOp::Intersect, true, _) => {
            return Some(Mesh::new())
        }
        (BooleanOp::Intersect, _, true) => return Some(Mesh::new()),
        _ => {}
    }

    if !boxes_disjoint(a.bounding_box(), b.bounding_box(), tolerance) {
        return None;
    }

    Some(match op {
        BooleanOp::Union => {
            let mut merged = a.clone();
            merged.merge(b);
            merged
        }
        BooleanOp::Difference => a.clone(),
        BooleanOp::Intersect => Mesh::new(),
    })
}

fn boxes_disjoint(a: (DVec3, DVec3), b: (DVec3, DVec3), tolerance: f64) -> bool {
    let (min_a, max_a) = a;
    let (min_b, max_b) = b;
    max_a.cmplt(min_b - tolerance).any() || max_b.cmplt(min_a - tolerance).any()
}

// =============================================================================
// CONVERSION HELPERS
// =============================================================================

fn combine(a: BspTree, b: BspTree) -> Vec<Polygon> {
    let mut polygons = a.into_polygons();
    polygons.extend(b.into_polygons());
    polygons
}

fn inverted(mut polygons: Vec<Polygon>) -> Vec<Polygon> {
    for poly in &mut polygons {
        poly.flip();
    }
    polygons
}

/// Converts every mesh face into one or more convex BSP polygons.
fn mesh_to_polygons(mesh: &Mesh, tolerance: f64) -> Vec<Polygon> {
    mesh.faces()
        .iter()
        .flat_map(|face| {
            let points = face.iter().map(|&i| mesh.vertex(i)).collect();
            Polygon::from_face(points, tolerance)
        })
        .collect()
}

/// Converts polygons back to a mesh, welding coincident vertices.
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut welder = VertexWelder::new(WELD_EPSILON);
    let mut faces = Vec::with_capacity(polygons.len());

    for poly in polygons {
        let mut face: Vec<u32> = Vec::with_capacity(poly.vertices.len());
        for v in &poly.vertices {
            let index = welder.insert(*v);
            if face.last() != Some(&index) {
                face.push(index);
            }
        }
        while face.len() > 1 && face.first() == face.last() {
            face.pop();
        }
        if face.len() >= 3 {
            faces.push(face);
        }
    }

    Mesh::from_parts(welder.into_positions(), faces)
}
