//! # FDM Joint
//!
//! Parametric geometry for print-in-place hinge joints on FDM printers.
//!
//! ## Architecture
//!
//! ```text
//! JointInputs → ParameterSet → AssemblyPlan → Assembler → MeshSink (Mesh)
//!                              (primitives)   (booleans)
//! ```
//!
//! - **params**: validation and derived dimensions
//! - **profile**: loop-and-bridge mesh construction
//! - **primitives**: socket, axle, arm, arm space, separator, floor
//! - **assembler**: ordered boolean plan and its execution
//! - **sink**: handle-based mesh storage; [`CsgSink`] runs the BSP solver
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fdm_joint::{build_joint_mesh, JointInputs, Placement};
//!
//! let mesh = build_joint_mesh(&JointInputs::default(), &Placement::identity())?;
//! assert!(mesh.signed_volume() > 0.0);
//! # Ok::<(), fdm_joint::JointError>(())
//! ```

pub mod assembler;
pub mod error;
pub mod params;
pub mod primitives;
pub mod profile;
pub mod sink;

pub use assembler::{Assembler, AssemblyPlan, AssemblyState};
pub use error::JointError;
pub use params::{JointInputs, JointVariant, ParameterSet};
pub use primitives::{SeparatorSpec, Shape};
pub use sink::{CsgSink, MeshHandle, MeshSink, Placement, SinkError};

use glam::DVec3;
use joint_mesh::Mesh;
use tracing::info;

/// Builds a joint into `sink` and returns the handle of the finished solid.
///
/// The joint sits on z = -1 with its axle centred on X. `placement` is then
/// applied about the axle centre, so a caller rotation swings the joint
/// around its own axle rather than around the bed.
///
/// # Errors
///
/// - [`JointError::Constraint`] when the inputs are rejected; nothing is
///   generated.
/// - [`JointError::BooleanFailure`] when a boolean step fails.
pub fn build_joint<S: MeshSink>(
    sink: &mut S,
    inputs: &JointInputs,
    placement: &Placement,
) -> Result<S::Handle, JointError> {
    let params = ParameterSet::derive(inputs)?;
    info!(
        variant = ?params.variant,
        size = params.size,
        clearance = params.clearance,
        resolution = params.resolution,
        "building joint"
    );

    let plan = AssemblyPlan::for_params(&params);
    let handle = Assembler::new(sink, &params).run(&plan)?;

    if !placement.is_identity() {
        let pivot = DVec3::new(0.0, 0.0, params.raise_z);
        sink.transform(&handle, &placement.about_pivot(pivot));
    }
    Ok(handle)
}

/// Runs [`build_joint`] on a fresh [`CsgSink`] and returns the mesh.
///
/// # Errors
///
/// As [`build_joint`].
pub fn build_joint_mesh(inputs: &JointInputs, placement: &Placement) -> Result<Mesh, JointError> {
    let mut sink = CsgSink::new();
    let handle = build_joint(&mut sink, inputs, placement)?;
    sink.take(handle).map_err(lost_result)
}

/// The finished handle came from this very sink, so losing its mesh is a
/// sink fault after the last step rather than a problem with the inputs.
fn lost_result(err: SinkError) -> JointError {
    JointError::BooleanFailure {
        // Both plans finish by cutting the axle.
        op: joint_mesh::BooleanOp::Difference,
        stage: "result".to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_result_is_not_a_constraint() {
        let err = lost_result(SinkError::UnknownHandle(7));
        assert!(matches!(err, JointError::BooleanFailure { ref stage, .. } if stage == "result"));
        assert!(err.to_string().contains("Unknown mesh handle 7"));
    }

    #[test]
    fn test_every_plan_ends_with_the_axle_cut() {
        for variant in [JointVariant::OneSided, JointVariant::TwoSided] {
            let params = ParameterSet::derive(&JointInputs {
                variant,
                ..JointInputs::default()
            })
            .unwrap();
            let plan = AssemblyPlan::for_params(&params);
            assert_eq!(plan.last_op(), joint_mesh::BooleanOp::Difference);
            assert!(plan.steps.last().is_some_and(|step| step.part.shape == Shape::Axle));
        }
    }
}
