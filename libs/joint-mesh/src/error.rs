//! # Mesh Errors
//!
//! Error types for mesh construction and boolean operations.

use thiserror::Error;

/// Errors that can occur while validating or combining meshes.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A face references a vertex that does not exist or has too few corners.
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// A vertex coordinate is NaN or infinite.
    #[error("Non-finite vertex {index}")]
    NonFiniteVertex { index: usize },

    /// Boolean operation produced unusable output.
    #[error("Boolean operation failed: {message}")]
    BooleanFailed { message: String },
}

impl MeshError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a boolean operation failed error.
    pub fn boolean_failed(message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            message: message.into(),
        }
    }
}
