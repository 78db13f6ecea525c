//! # Primitives
//!
//! Mesh generation for the six joint parts (socket, axle, arm, arm space,
//! separator, floor).
//!
//! Every generator is a pure function of the derived parameters and emits a
//! closed, outward-facing polygon mesh in the joint's local frame.

pub mod arm;
pub mod arm_space;
pub mod axle;
pub mod floor;
pub mod separator;
pub mod socket;

use joint_mesh::Mesh;
use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;

pub use arm::arm;
pub use arm_space::arm_space;
pub use axle::axle;
pub use floor::floor;
pub use separator::{separator, SeparatorSpec};
pub use socket::socket;

/// A joint part as data, so assembly plans can be inspected before any
/// geometry exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Socket,
    Axle,
    Arm,
    /// Arm space reaching `depth` along Y; `None` stops at the arm end.
    ArmSpace { depth: Option<f64> },
    Separator(SeparatorSpec),
    Floor,
}

impl Shape {
    /// Generates this part's mesh.
    pub fn generate(&self, params: &ParameterSet) -> Mesh {
        match self {
            Shape::Socket => socket(params),
            Shape::Axle => axle(params),
            Shape::Arm => arm(params),
            Shape::ArmSpace { depth } => arm_space(params, *depth),
            Shape::Separator(spec) => separator(spec, params.resolution),
            Shape::Floor => floor(params),
        }
    }

    /// Short lowercase name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Socket => "socket",
            Shape::Axle => "axle",
            Shape::Arm => "arm",
            Shape::ArmSpace { .. } => "arm_space",
            Shape::Separator(_) => "separator",
            Shape::Floor => "floor",
        }
    }
}
