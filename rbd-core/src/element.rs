//! The force-element capability.

use nalgebra::DVector;
use rbd_types::Result;

use crate::model::KinematicsModel;

/// A unit that contributes a generalized force to the system.
///
/// Elements are list-owned by the orchestrator; their insertion order only
/// determines how the system input vector is sliced, never the semantics.
/// Evaluation is a pure function of its arguments: no hidden state is
/// mutated, and the model plus cache arrive as parameters rather than
/// through a stored back-reference.
pub trait ForceElement<M: KinematicsModel>: Send + Sync {
    /// Identifying name of this element.
    fn name(&self) -> &str;

    /// Number of input scalars this element consumes.
    fn num_inputs(&self) -> usize {
        0
    }

    /// Generalized force contribution, length = velocity count, zero
    /// outside the velocity indices the element's kinematic path touches.
    ///
    /// `u` has exactly [`Self::num_inputs`] entries, sliced from the system
    /// input vector.
    ///
    /// # Errors
    ///
    /// Implementations report evaluation failures through the shared error
    /// enum; the built-in elements are infallible after construction.
    fn generalized_force(
        &self,
        t: f64,
        u: &[f64],
        model: &M,
        cache: &M::Cache,
    ) -> Result<DVector<f64>>;
}
