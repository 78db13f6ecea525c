//! # Mesh Sink
//!
//! The seam between joint assembly and whatever holds the meshes.
//!
//! Assembly never touches meshes directly after generation: it hands them to
//! a [`MeshSink`], receives opaque handles back and asks the sink to combine,
//! clean and move them. Boolean operations consume both operand handles, so
//! a handle can never be used after its mesh has been folded into another.
//!
//! [`CsgSink`] is the in-memory implementation backed by the BSP solver.

use std::collections::HashMap;

use config::constants::{CsgConfig, CLEANUP_THRESHOLD};
use glam::{DAffine3, DQuat, DVec3, EulerRot};
use joint_mesh::ops::boolean::apply_with_tolerance;
use joint_mesh::{BooleanOp, EdgeReport, Mesh};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

// =============================================================================
// PLACEMENT
// =============================================================================

/// Rigid placement: rotate about the origin, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    pub fn identity() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Half turn about Z, then `offset`. Places the far half of a two-sided
    /// joint.
    pub fn mirrored_at(offset: DVec3) -> Self {
        Self {
            translation: offset,
            rotation: DQuat::from_rotation_z(std::f64::consts::PI),
        }
    }

    /// Location plus XYZ Euler angles in radians, applied X first.
    pub fn from_location_euler(location: DVec3, euler: DVec3) -> Self {
        Self {
            translation: location,
            rotation: DQuat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x),
        }
    }

    /// This placement applied about `pivot` instead of the origin.
    ///
    /// Points at the pivot end up at `pivot + translation`.
    pub fn about_pivot(&self, pivot: DVec3) -> Self {
        Self {
            translation: pivot + self.translation - self.rotation * pivot,
            rotation: self.rotation,
        }
    }

    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_rotation_translation(self.rotation, self.translation)
    }

    /// Transforms a single point.
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// True when applying this placement changes nothing.
    pub fn is_identity(&self) -> bool {
        self.translation == DVec3::ZERO && self.rotation == DQuat::IDENTITY
    }
}

// =============================================================================
// SINK TRAIT
// =============================================================================

/// Errors reported by a mesh sink.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkError {
    #[error("Unknown mesh handle {0}")]
    UnknownHandle(u64),

    /// The solver rejected the operation or produced an unusable result.
    #[error("Solver failure: {0}")]
    Solver(String),
}

impl SinkError {
    /// Solver error describing why `report` is not a closed manifold.
    pub fn not_manifold(what: impl std::fmt::Display, report: &EdgeReport) -> Self {
        Self::Solver(format!(
            "{what} is not a closed manifold ({} open, {} non-manifold, {} inconsistent edges)",
            report.boundary_edges, report.non_manifold_edges, report.inconsistent_edges
        ))
    }
}

/// Storage and operations for meshes addressed by handle.
pub trait MeshSink {
    /// Move-only reference to a mesh held by the sink.
    type Handle;

    /// Takes ownership of a mesh and returns its handle.
    fn materialize(&mut self, mesh: Mesh) -> Self::Handle;

    /// Combines `a` with `b`, consuming both. The result keeps `a`'s
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when either handle is unknown, the solver fails
    /// or its result is empty or not a closed manifold. Both operands are
    /// gone either way.
    fn boolean(
        &mut self,
        a: Self::Handle,
        b: Self::Handle,
        op: BooleanOp,
    ) -> Result<Self::Handle, SinkError>;

    /// Dissolves geometry smaller than `threshold` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the handle is unknown or the cleaned mesh
    /// is not a closed manifold. A mesh that fails is discarded.
    fn cleanup(&mut self, handle: &Self::Handle, threshold: f64) -> Result<(), SinkError>;

    /// Threshold the final cleanup pass runs with.
    fn cleanup_threshold(&self) -> f64 {
        CLEANUP_THRESHOLD
    }

    /// Applies a placement in place.
    fn transform(&mut self, handle: &Self::Handle, placement: &Placement);
}

// =============================================================================
// CSG SINK
// =============================================================================

/// Handle into a [`CsgSink`]. Not `Clone`: boolean operations move it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(u64);

impl MeshHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// In-memory sink running booleans through the BSP solver.
#[derive(Debug, Default)]
pub struct CsgSink {
    meshes: HashMap<u64, Mesh>,
    next_id: u64,
    config: CsgConfig,
}

impl CsgSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CsgConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CsgConfig {
        &self.config
    }

    /// Number of meshes currently held.
    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn get(&self, handle: &MeshHandle) -> Option<&Mesh> {
        self.meshes.get(&handle.0)
    }

    /// Removes a mesh from the sink, consuming its handle.
    pub fn take(&mut self, handle: MeshHandle) -> Result<Mesh, SinkError> {
        self.meshes
            .remove(&handle.0)
            .ok_or(SinkError::UnknownHandle(handle.0))
    }
}

impl MeshSink for CsgSink {
    type Handle = MeshHandle;

    fn materialize(&mut self, mesh: Mesh) -> MeshHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.meshes.insert(id, mesh);
        MeshHandle(id)
    }

    fn boolean(
        &mut self,
        a: MeshHandle,
        b: MeshHandle,
        op: BooleanOp,
    ) -> Result<MeshHandle, SinkError> {
        let lhs = self.meshes.remove(&a.0);
        let rhs = self.meshes.remove(&b.0);
        let (lhs, rhs) = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => (lhs, rhs),
            (None, _) => return Err(SinkError::UnknownHandle(a.0)),
            (_, None) => return Err(SinkError::UnknownHandle(b.0)),
        };

        let result = apply_with_tolerance(&lhs, &rhs, op, self.config.tolerance)
            .map_err(|err| SinkError::Solver(err.to_string()))?;
        if result.is_empty() {
            return Err(SinkError::Solver(format!("{op} produced an empty mesh")));
        }
        let report = result.edge_report();
        if !report.is_closed_manifold() {
            return Err(SinkError::not_manifold(format_args!("{op} result"), &report));
        }

        debug!(
            %op,
            lhs_faces = lhs.face_count(),
            rhs_faces = rhs.face_count(),
            faces = result.face_count(),
            "boolean applied"
        );
        self.meshes.insert(a.0, result);
        Ok(a)
    }

    fn cleanup(&mut self, handle: &MeshHandle, threshold: f64) -> Result<(), SinkError> {
        let mesh = self
            .meshes
            .get_mut(&handle.0)
            .ok_or(SinkError::UnknownHandle(handle.0))?;

        mesh.dissolve_degenerate(threshold);
        let report = mesh.edge_report();
        if !report.is_closed_manifold() {
            self.meshes.remove(&handle.0);
            return Err(SinkError::not_manifold("cleaned mesh", &report));
        }
        Ok(())
    }

    fn cleanup_threshold(&self) -> f64 {
        self.config.cleanup_threshold
    }

    fn transform(&mut self, handle: &MeshHandle, placement: &Placement) {
        match self.meshes.get_mut(&handle.0) {
            Some(mesh) => mesh.transform(&placement.to_affine()),
            None => warn!(handle = handle.0, "transform on unknown handle"),
        }
    }
}
