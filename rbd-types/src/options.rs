//! Constraint solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How contact enters the dynamics formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactMode {
    /// Contact forces follow the compliant penalty law and fold directly
    /// into the bias term. The problem stays equality-only and takes the
    /// direct least-squares path.
    #[default]
    Compliant,

    /// Contact adds complementarity rows (one normal, two friction per
    /// point), introducing force variables and dispatching to the
    /// iterative solver.
    Constraint,
}

/// Configuration for the dynamics formulation and its solvers.
///
/// # Example
///
/// ```
/// use rbd_types::{ContactMode, SolverOptions};
///
/// let options = SolverOptions::default()
///     .with_contact_mode(ContactMode::Constraint)
///     .with_max_iterations(200);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverOptions {
    /// Baumgarte stabilization rate constant `alpha` (1/s).
    ///
    /// Position equality constraints are stabilized critically damped:
    /// `phidd = -Jdot*v - 2*alpha*phid - alpha^2*phi`; velocity constraints
    /// with `psid = -alpha*psi`.
    pub stabilization_rate: f64,

    /// Maximum iterations for the projected Gauss-Seidel solver.
    pub max_iterations: usize,

    /// Convergence tolerance on the constraint-space residual norm.
    ///
    /// Also used by the direct path to classify an inconsistent equality
    /// system as infeasible.
    pub tolerance: f64,

    /// Regularization added to the diagonal of the constraint-space
    /// operator for numerical stability.
    pub regularization: f64,

    /// Contact formulation mode.
    pub contact_mode: ContactMode,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            stabilization_rate: 5.0,
            max_iterations: 100,
            tolerance: 1e-6,
            regularization: 1e-9,
            contact_mode: ContactMode::Compliant,
        }
    }
}

impl SolverOptions {
    /// High-accuracy configuration for offline analysis.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-10,
            regularization: 1e-12,
            ..Default::default()
        }
    }

    /// Fast configuration for real-time loops.
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-4,
            regularization: 1e-8,
            ..Default::default()
        }
    }

    /// Set the stabilization rate.
    #[must_use]
    pub const fn with_stabilization_rate(mut self, alpha: f64) -> Self {
        self.stabilization_rate = alpha;
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the contact mode.
    #[must_use]
    pub const fn with_contact_mode(mut self, mode: ContactMode) -> Self {
        self.contact_mode = mode;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first out-of-range field.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.stabilization_rate < 0.0 || !self.stabilization_rate.is_finite() {
            return Err("stabilization_rate cannot be negative");
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1");
        }
        if self.tolerance <= 0.0 || !self.tolerance.is_finite() {
            return Err("tolerance must be positive");
        }
        if self.regularization < 0.0 || !self.regularization.is_finite() {
            return Err("regularization cannot be negative");
        }
        Ok(())
    }
}
