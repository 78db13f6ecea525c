//! # Boolean Assembler
//!
//! Turns derived parameters into one solid by folding placed primitives into
//! a base shape, one boolean at a time.
//!
//! The sequence of operations is data ([`AssemblyPlan`]) built up front, so
//! it can be inspected and tested without generating any geometry. Running a
//! plan moves the assembler through four states:
//!
//! ```text
//! Building ──► Combining ──► Cleaning ──► Done
//! (generate)   (fold ops)    (raise, dissolve)
//! ```

use config::constants::{ARM_SPACE_OVERSHOOT_DIVISOR, MIN_COMPLEMENT_ANGLE, PRINT_ANGLE};
use glam::DVec3;
use joint_mesh::{BooleanOp, Mesh};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::JointError;
use crate::params::{JointVariant, ParameterSet};
use crate::primitives::{SeparatorSpec, Shape};
use crate::sink::{MeshSink, Placement};

// =============================================================================
// PLAN
// =============================================================================

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Building,
    Combining,
    Cleaning,
    Done,
}

/// A primitive with its label and placement in the joint frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedShape {
    /// Stage name reported when a boolean on this shape fails.
    pub label: &'static str,
    pub shape: Shape,
    pub placement: Placement,
}

impl PlacedShape {
    pub fn new(label: &'static str, shape: Shape, placement: Placement) -> Self {
        Self {
            label,
            shape,
            placement,
        }
    }
}

/// One boolean folding `part` into the accumulated solid.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyStep {
    pub part: PlacedShape,
    pub op: BooleanOp,
}

/// Ordered construction of a joint.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPlan {
    pub base: PlacedShape,
    pub steps: Vec<AssemblyStep>,
}

impl AssemblyPlan {
    /// The plan for the requested variant.
    pub fn for_params(params: &ParameterSet) -> Self {
        match params.variant {
            JointVariant::OneSided => Self::one_sided(params),
            JointVariant::TwoSided => Self::two_sided(params),
        }
    }

    /// Single joint whose separator carves its own rotation stop.
    pub fn one_sided(params: &ParameterSet) -> Self {
        let at_origin = Placement::identity();
        let complement = |angle: f64| {
            let a = PRINT_ANGLE - angle;
            if a <= 0.0 {
                MIN_COMPLEMENT_ANGLE
            } else {
                a
            }
        };

        let outer = Shape::Separator(SeparatorSpec {
            tip_y: params.separator_y,
            xz_radius: params.separator_outer_r,
            h_angle: PRINT_ANGLE,
            up_angle: PRINT_ANGLE,
            down_angle: PRINT_ANGLE,
        });
        let stop = Shape::Separator(SeparatorSpec {
            tip_y: params.separator_y + params.clearance,
            xz_radius: 2.0 * params.separator_outer_r,
            h_angle: complement(params.bendable_angle),
            up_angle: complement(params.up_angle),
            down_angle: complement(params.down_angle),
        });

        let mut plan = Self::new(PlacedShape::new(
            "arm space",
            Shape::ArmSpace { depth: None },
            at_origin,
        ));
        plan.push(BooleanOp::Union, "separator", outer, at_origin);
        plan.push(BooleanOp::Union, "socket", Shape::Socket, at_origin);
        plan.push(BooleanOp::Difference, "bending stop", stop, at_origin);
        plan.push(BooleanOp::Difference, "floor", Shape::Floor, at_origin);
        plan.push(BooleanOp::Difference, "arm", Shape::Arm, at_origin);
        plan.push(BooleanOp::Difference, "axle", Shape::Axle, at_origin);
        plan
    }

    /// Two mirrored halves sharing one separator, the far half turned 180°
    /// about Z.
    pub fn two_sided(params: &ParameterSet) -> Self {
        let offset = DVec3::new(0.0, params.separator_y, 0.0);
        let near = Placement::translation(-offset);
        let far = Placement::mirrored_at(offset);
        let far_unturned = Placement::translation(offset);

        let separator = |xz_radius: f64| {
            Shape::Separator(SeparatorSpec {
                tip_y: params.separator_y,
                xz_radius,
                h_angle: params.bendable_angle,
                up_angle: params.up_angle,
                down_angle: params.down_angle,
            })
        };
        let arm_space = Shape::ArmSpace {
            depth: Some(params.separator_y + params.clearance / ARM_SPACE_OVERSHOOT_DIVISOR),
        };

        let mut plan = Self::new(PlacedShape::new(
            "near separator",
            separator(params.separator_outer_r),
            near,
        ));
        // The wider far separator keeps the intersection away from
        // coincident cylinder walls.
        plan.push(
            BooleanOp::Intersect,
            "far separator",
            separator(params.separator_outer_r + params.clearance),
            far,
        );
        plan.push(BooleanOp::Union, "near arm space", arm_space, near);
        plan.push(BooleanOp::Union, "far arm space", arm_space, far);
        plan.push(BooleanOp::Union, "near socket", Shape::Socket, near);
        plan.push(BooleanOp::Union, "far socket", Shape::Socket, far_unturned);
        plan.push(BooleanOp::Difference, "floor", Shape::Floor, Placement::identity());
        plan.push(BooleanOp::Difference, "near arm", Shape::Arm, near);
        plan.push(BooleanOp::Difference, "far arm", Shape::Arm, far);
        plan.push(BooleanOp::Difference, "near axle", Shape::Axle, near);
        plan.push(BooleanOp::Difference, "far axle", Shape::Axle, far_unturned);
        plan
    }

    fn new(base: PlacedShape) -> Self {
        Self {
            base,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, op: BooleanOp, label: &'static str, shape: Shape, placement: Placement) {
        self.steps.push(AssemblyStep {
            part: PlacedShape::new(label, shape, placement),
            op,
        });
    }

    /// The operation that produced the finished solid.
    ///
    /// A plan without steps is its base shape, which counts as a union onto
    /// nothing.
    pub fn last_op(&self) -> BooleanOp {
        self.steps.last().map_or(BooleanOp::Union, |step| step.op)
    }

    /// Every shape in order, base first.
    pub fn parts(&self) -> impl Iterator<Item = &PlacedShape> {
        std::iter::once(&self.base).chain(self.steps.iter().map(|step| &step.part))
    }
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Runs an [`AssemblyPlan`] against a mesh sink.
pub struct Assembler<'a, S: MeshSink> {
    sink: &'a mut S,
    params: &'a ParameterSet,
    state: AssemblyState,
}

impl<'a, S: MeshSink> Assembler<'a, S> {
    pub fn new(sink: &'a mut S, params: &'a ParameterSet) -> Self {
        Self {
            sink,
            params,
            state: AssemblyState::Building,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Generates, combines, raises and cleans the plan's parts.
    ///
    /// Returns the handle of the single remaining solid. On failure the
    /// handles already consumed are gone and nothing else stays live.
    ///
    /// # Errors
    ///
    /// Returns [`JointError::BooleanFailure`] naming the failing step, or
    /// the stage `cleanup` when the finished solid does not survive the
    /// cleanup pass.
    pub fn run(&mut self, plan: &AssemblyPlan) -> Result<S::Handle, JointError> {
        self.state = AssemblyState::Building;
        let params = self.params;
        let (base, operands): (Mesh, Vec<Mesh>) = rayon::join(
            || plan.base.shape.generate(params),
            || {
                plan.steps
                    .par_iter()
                    .map(|step| step.part.shape.generate(params))
                    .collect()
            },
        );
        debug!(parts = operands.len() + 1, "generated primitives");

        self.state = AssemblyState::Combining;
        let mut acc = self.place(base, &plan.base.placement);
        for (step, mesh) in plan.steps.iter().zip(operands) {
            let operand = self.place(mesh, &step.part.placement);
            acc = self
                .sink
                .boolean(acc, operand, step.op)
                .map_err(|err| JointError::BooleanFailure {
                    op: step.op,
                    stage: step.part.label.to_string(),
                    message: err.to_string(),
                })?;
            debug!(op = %step.op, stage = step.part.label, shape = step.part.shape.name(), "step applied");
        }

        self.state = AssemblyState::Cleaning;
        let raise = Placement::translation(DVec3::new(0.0, 0.0, params.raise_z));
        self.sink.transform(&acc, &raise);
        let threshold = self.sink.cleanup_threshold();
        self.sink
            .cleanup(&acc, threshold)
            .map_err(|err| JointError::BooleanFailure {
                op: plan.last_op(),
                stage: "cleanup".to_string(),
                message: err.to_string(),
            })?;

        self.state = AssemblyState::Done;
        info!(
            variant = ?params.variant,
            steps = plan.steps.len(),
            raise_z = params.raise_z,
            "joint assembled"
        );
        Ok(acc)
    }

    fn place(&mut self, mesh: Mesh, placement: &Placement) -> S::Handle {
        let handle = self.sink.materialize(mesh);
        if !placement.is_identity() {
            self.sink.transform(&handle, placement);
        }
        handle
    }
}
