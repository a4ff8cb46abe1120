//! Error types for dynamics evaluation.

use thiserror::Error;

/// Errors that can occur while formulating or solving forward dynamics.
///
/// All four kinds surface to the caller (the integration/control loop);
/// none are retried internally. Retry or step-size policy belongs to the
/// integrator, not this core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamicsError {
    /// A state or input vector disagrees with the model-derived sizes.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which vector was mis-sized (e.g. "state", "input").
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },

    /// Invalid configuration, detected at construction time.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Description of the configuration error.
        reason: String,
    },

    /// The assembled constraint set admits no feasible solution.
    #[error("dynamics infeasible: {reason}")]
    Infeasible {
        /// Description of the inconsistency.
        reason: String,
        /// Residual norm at the best attainable point, when available.
        residual: Option<f64>,
    },

    /// An iterative solver exhausted its iteration budget.
    #[error(
        "solver did not converge after {iterations} iterations: \
         residual {residual:.3e} > tolerance {tolerance:.3e}"
    )]
    DidNotConverge {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Residual norm at the final iterate.
        residual: f64,
        /// Tolerance the solver was asked to reach.
        tolerance: f64,
    },
}

impl DynamicsError {
    /// Create a dimension-mismatch error.
    #[must_use]
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an infeasibility error without a residual.
    #[must_use]
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self::Infeasible {
            reason: reason.into(),
            residual: None,
        }
    }

    /// Create an infeasibility error carrying the attained residual.
    #[must_use]
    pub fn infeasible_with_residual(reason: impl Into<String>, residual: f64) -> Self {
        Self::Infeasible {
            reason: reason.into(),
            residual: Some(residual),
        }
    }

    /// Check if this is a dimension-mismatch error.
    #[must_use]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this is an infeasibility error.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }

    /// Check if this is a convergence failure.
    #[must_use]
    pub fn is_did_not_converge(&self) -> bool {
        matches!(self, Self::DidNotConverge { .. })
    }
}
