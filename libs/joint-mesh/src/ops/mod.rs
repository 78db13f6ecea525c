//! # Mesh Operations
//!
//! Operations that combine meshes into new meshes.

pub mod boolean;
