//! # Mesh Data Structure
//!
//! Polygon mesh with shared vertices and counter-clockwise faces.

use std::collections::HashMap;

use glam::{DAffine3, DVec3};

use crate::error::MeshError;

/// A polygon mesh with vertices and ordered faces.
///
/// Faces list vertex indices counter-clockwise when viewed from outside, so
/// the right-hand normal points out of the solid. All geometry is f64.
///
/// # Example
///
/// ```rust
/// use joint_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_face(vec![0, 1, 2]);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<u32>>,
}

/// Directed-edge statistics of a mesh.
///
/// A closed 2-manifold surface has every undirected edge shared by exactly
/// two faces that traverse it in opposite directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeReport {
    /// Edges used by a single face.
    pub boundary_edges: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edges: usize,
    /// Edges used twice in the same direction.
    pub inconsistent_edges: usize,
}

impl EdgeReport {
    /// Returns true when the surface is closed and consistently oriented.
    #[inline]
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0 && self.inconsistent_edges == 0
    }
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Builds a mesh from raw parts without validation.
    pub fn from_parts(vertices: Vec<DVec3>, faces: Vec<Vec<u32>>) -> Self {
        Self { vertices, faces }
    }

    /// Consumes the mesh, returning its vertices and faces.
    pub fn into_parts(self) -> (Vec<DVec3>, Vec<Vec<u32>>) {
        (self.vertices, self.faces)
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a face by vertex indices.
    pub fn add_face(&mut self, indices: Vec<u32>) {
        self.faces.push(indices);
    }

    /// Overwrites the position of an existing vertex.
    ///
    /// Out-of-range indices are ignored.
    pub fn set_vertex(&mut self, index: u32, position: DVec3) {
        if let Some(v) = self.vertices.get_mut(index as usize) {
            *v = position;
        }
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the faces.
    #[inline]
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices[1..]
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Applies a rigid or affine transform to every vertex.
    ///
    /// Orientation-reversing transforms also reverse face winding so normals
    /// keep pointing outward.
    pub fn transform(&mut self, transform: &DAffine3) {
        for v in &mut self.vertices {
            *v = transform.transform_point3(*v);
        }
        if transform.matrix3.determinant() < 0.0 {
            for face in &mut self.faces {
                face.reverse();
            }
        }
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Appends another mesh's vertices and faces to this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|face| face.iter().map(|i| i + offset).collect()),
        );
    }

    /// Returns the area-weighted normal of a face (Newell's method).
    ///
    /// Its length is twice the polygon area.
    pub fn face_normal(&self, face: &[u32]) -> DVec3 {
        let mut normal = DVec3::ZERO;
        for (i, &a) in face.iter().enumerate() {
            let p = self.vertices[a as usize];
            let q = self.vertices[face[(i + 1) % face.len()] as usize];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal
    }

    /// Returns the area of a face.
    #[inline]
    pub fn face_area(&self, face: &[u32]) -> f64 {
        self.face_normal(face).length() * 0.5
    }

    /// Computes the signed enclosed volume via the divergence theorem.
    ///
    /// Positive for a closed surface with outward-facing winding.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let a = self.vertices[face[0] as usize];
            for w in face[1..].windows(2) {
                let b = self.vertices[w[0] as usize];
                let c = self.vertices[w[1] as usize];
                volume += a.dot(b.cross(c));
            }
        }
        volume / 6.0
    }

    /// Counts boundary, non-manifold and inconsistently oriented edges.
    pub fn edge_report(&self) -> EdgeReport {
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for face in &self.faces {
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                *directed.entry((a, b)).or_default() += 1;
            }
        }

        let mut report = EdgeReport::default();
        for (&(a, b), &forward) in &directed {
            let backward = directed.get(&(b, a)).copied().unwrap_or(0);
            // Visit each undirected edge once.
            if backward > 0 && (a, b) > (b, a) {
                continue;
            }
            match forward + backward {
                1 => report.boundary_edges += 1,
                2 if forward == 1 => {}
                2 => report.inconsistent_edges += 1,
                _ => report.non_manifold_edges += 1,
            }
        }
        report
    }

    /// Returns true when the mesh is a closed, consistently oriented manifold.
    pub fn is_manifold(&self) -> bool {
        self.edge_report().is_closed_manifold()
    }

    /// Validates the mesh for structural correctness.
    ///
    /// Checks:
    /// - All vertices are finite
    /// - All face indices are in range
    /// - Every face has at least three corners
    pub fn validate(&self) -> Result<(), MeshError> {
        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFiniteVertex { index });
        }

        let vertex_count = self.vertices.len() as u32;
        for (i, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::invalid_topology(format!(
                    "face {i} has {} vertices",
                    face.len()
                )));
            }
            if let Some(bad) = face.iter().find(|&&idx| idx >= vertex_count) {
                return Err(MeshError::invalid_topology(format!(
                    "face {i} references vertex {bad} of {vertex_count}"
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy with every face fan-triangulated.
    pub fn triangulated(&self) -> Mesh {
        let mut faces = Vec::with_capacity(self.faces.len() * 2);
        for face in &self.faces {
            for w in face[1..].windows(2) {
                faces.push(vec![face[0], w[0], w[1]]);
            }
        }
        Mesh::from_parts(self.vertices.clone(), faces)
    }
}
