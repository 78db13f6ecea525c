//! # Joint Errors
//!
//! The two ways a joint build can fail.

use joint_mesh::BooleanOp;
use thiserror::Error;

/// Errors returned by joint construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JointError {
    /// Inputs are out of range or violate the axle clearance precondition.
    ///
    /// Raised before any mesh is generated; adjusting inputs recovers.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// A boolean step was rejected by the mesh sink.
    #[error("Boolean {op} failed at stage '{stage}': {message}")]
    BooleanFailure {
        op: BooleanOp,
        stage: String,
        message: String,
    },
}

impl JointError {
    /// Creates a constraint error.
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }
}
