//! # Joint Mesh
//!
//! Polygon meshes and constructive solid geometry for the FDM joint pipeline.
//!
//! ## Architecture
//!
//! ```text
//! fdm-joint (primitives) → joint-mesh (Mesh, booleans, cleanup)
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust with no native dependencies:
//! - **Boolean Operations**: BSP trees (csg.js algorithm)
//! - **Cleanup**: Vertex welding, degenerate face removal, T-junction repair
//! - **Analysis**: Directed-edge manifold checks, divergence-theorem volume
//!
//! ## Usage
//!
//! ```rust
//! use joint_mesh::{apply, BooleanOp, Mesh};
//! use glam::DVec3;
//!
//! let mut a = Mesh::new();
//! let b = Mesh::new();
//! a.add_vertex(DVec3::ZERO);
//! let result = apply(&a, &b, BooleanOp::Union).unwrap();
//! assert_eq!(result.face_count(), 0);
//! ```

pub mod cleanup;
pub mod error;
pub mod mesh;
pub mod ops;
pub mod weld;

pub use cleanup::CleanupStats;
pub use error::MeshError;
pub use mesh::{EdgeReport, Mesh};
pub use ops::boolean::{apply, apply_with_tolerance, difference, intersection, union, BooleanOp};
pub use weld::VertexWelder;
