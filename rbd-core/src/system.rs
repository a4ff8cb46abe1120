//! The system orchestrator.

use std::path::Path;
use std::sync::Arc;

use nalgebra::DVector;
use rbd_types::{ContactParams, DynamicsError, FloatingBaseType, Result, SolverOptions};

use crate::element::ForceElement;
use crate::formulation;
use crate::loader::DescriptionLoader;
use crate::model::KinematicsModel;

/// An articulated rigid-body system: a kinematic model plus force elements
/// and contact parameters, exposing the forward-dynamics evaluation
/// contract.
///
/// Evaluation methods take `&self` and construct/discard their own
/// per-call dynamics problem, so concurrent evaluation with distinct state
/// vectors is safe; mutation (adding elements, changing parameters) takes
/// `&mut self` and is therefore excluded by the borrow checker while
/// evaluations run.
pub struct RigidBodySystem<M: KinematicsModel> {
    model: Arc<M>,
    elements: Vec<Box<dyn ForceElement<M>>>,
    contact_params: ContactParams,
    solver_options: SolverOptions,
}

impl<M: KinematicsModel> std::fmt::Debug for RigidBodySystem<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigidBodySystem")
            .field("num_elements", &self.elements.len())
            .field("contact_params", &self.contact_params)
            .field("solver_options", &self.solver_options)
            .finish_non_exhaustive()
    }
}

impl<M: KinematicsModel> RigidBodySystem<M> {
    /// Wrap an existing kinematic model handle.
    #[must_use]
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            elements: Vec::new(),
            contact_params: ContactParams::default(),
            solver_options: SolverOptions::default(),
        }
    }

    /// Take ownership of a model.
    #[must_use]
    pub fn from_model(model: M) -> Self {
        Self::new(Arc::new(model))
    }

    /// Build a system from an in-memory robot description.
    ///
    /// # Errors
    ///
    /// Propagates the loader's configuration errors.
    pub fn from_description<L>(
        loader: &L,
        text: &str,
        floating_base: FloatingBaseType,
    ) -> Result<Self>
    where
        L: DescriptionLoader<Model = M>,
    {
        Ok(Self::from_model(loader.load_str(text, floating_base)?))
    }

    /// Build a system from a robot-description file.
    ///
    /// # Errors
    ///
    /// Propagates the loader's configuration errors.
    pub fn from_description_file<L>(
        loader: &L,
        path: &Path,
        floating_base: FloatingBaseType,
    ) -> Result<Self>
    where
        L: DescriptionLoader<Model = M>,
    {
        Ok(Self::from_model(loader.load_path(path, floating_base)?))
    }

    /// The kinematic model handle.
    #[must_use]
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Contact parameters, read on every evaluation.
    #[must_use]
    pub fn contact_params(&self) -> &ContactParams {
        &self.contact_params
    }

    /// Mutable contact parameters.
    pub fn contact_params_mut(&mut self) -> &mut ContactParams {
        &mut self.contact_params
    }

    /// Solver options.
    #[must_use]
    pub fn solver_options(&self) -> &SolverOptions {
        &self.solver_options
    }

    /// Mutable solver options.
    pub fn solver_options_mut(&mut self) -> &mut SolverOptions {
        &mut self.solver_options
    }

    /// Append a force element. O(1), no uniqueness constraint; the system's
    /// total input arity grows immediately.
    pub fn add_force_element(&mut self, element: Box<dyn ForceElement<M>>) {
        self.elements.push(element);
    }

    /// The registered force elements, in insertion order.
    #[must_use]
    pub fn force_elements(&self) -> &[Box<dyn ForceElement<M>>] {
        &self.elements
    }

    /// Number of generalized position coordinates.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.model.num_positions()
    }

    /// Number of generalized velocity coordinates.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.model.num_velocities()
    }

    /// State size: positions plus velocities.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_positions() + self.num_velocities()
    }

    /// Input size, recomputed on demand: the model's actuator count plus
    /// the arity of every currently registered element. Never cached,
    /// since elements can be added after construction.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.model.num_actuators()
            + self
                .elements
                .iter()
                .map(|element| element.num_inputs())
                .sum::<usize>()
    }

    /// Output size: the full state is observable.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_states()
    }

    /// The dynamics depend only on `(x, u)`, never directly on time.
    #[must_use]
    pub fn is_time_varying(&self) -> bool {
        false
    }

    /// The output does not depend on `u`.
    #[must_use]
    pub fn is_direct_feedthrough(&self) -> bool {
        false
    }

    /// Default initial state: the model's nominal configuration paired
    /// with zero velocity.
    #[must_use]
    pub fn initial_state(&self) -> DVector<f64> {
        let q = self.model.nominal_configuration();
        let mut x = DVector::zeros(self.num_states());
        x.rows_mut(0, q.len().min(self.num_positions()))
            .copy_from(&q);
        x
    }

    /// Evaluate the state derivative at `(t, x, u)`.
    ///
    /// The position derivative comes from the model's velocity-to-qdot
    /// map; the acceleration from the constrained dynamics formulation.
    ///
    /// # Errors
    ///
    /// - [`DynamicsError::DimensionMismatch`] if `x` or `u` is mis-sized,
    ///   before any numeric work.
    /// - [`DynamicsError::Infeasible`] / [`DynamicsError::DidNotConverge`]
    ///   from the solver layer.
    pub fn dynamics(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>> {
        let np = self.num_positions();
        let nv = self.num_velocities();
        if x.len() != np + nv {
            return Err(DynamicsError::dimension_mismatch("state", np + nv, x.len()));
        }
        let num_inputs = self.num_inputs();
        if u.len() != num_inputs {
            return Err(DynamicsError::dimension_mismatch(
                "input",
                num_inputs,
                u.len(),
            ));
        }

        let cache = self.model.kinematics(x.rows(0, np), x.rows(np, nv));
        let qdot = self.model.velocity_to_qdot(&cache);
        let vdot = formulation::compute_acceleration(
            self.model.as_ref(),
            &cache,
            u,
            &self.elements,
            &self.contact_params,
            &self.solver_options,
            t,
        )?;

        let mut xdot = DVector::zeros(np + nv);
        xdot.rows_mut(0, np).copy_from(&qdot);
        xdot.rows_mut(np, nv).copy_from(&vdot);
        Ok(xdot)
    }

    /// Identity observer: the full state is the output.
    ///
    /// # Errors
    ///
    /// Fails with a dimension mismatch if `x` is mis-sized.
    pub fn output(&self, _t: f64, x: &DVector<f64>, _u: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.num_states() {
            return Err(DynamicsError::dimension_mismatch(
                "state",
                self.num_states(),
                x.len(),
            ));
        }
        Ok(x.clone())
    }
}
