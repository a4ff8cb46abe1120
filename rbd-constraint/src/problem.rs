//! The per-evaluation dynamics problem arena.

use nalgebra::{DMatrix, DVector};
use rbd_types::{DynamicsError, Result, SolverOptions};

use crate::{direct, pgs};

/// Classification of a constraint row, driving force projection in the
/// iterative solver and dispatch between the solver paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintKind {
    /// Holonomic (position-level) equality, differentiated twice.
    /// Force variable unrestricted.
    PositionEquality,

    /// Velocity-level equality, differentiated once.
    /// Force variable unrestricted.
    VelocityEquality,

    /// Unilateral joint limit. Force variable clamped non-negative.
    JointLimit,

    /// Contact normal complementarity. Force variable clamped non-negative.
    ContactNormal,

    /// Tangential friction, box-bounded by the associated normal force
    /// (the linear approximation of the Coulomb cone).
    Friction {
        /// Row index of the contact-normal row bounding this force.
        normal_row: usize,
        /// Friction coefficient scaling the bound.
        mu: f64,
    },
}

impl ConstraintKind {
    /// Whether the row's force variable is unrestricted.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::PositionEquality | Self::VelocityEquality)
    }
}

/// One constraint row: `jacobian · a = rhs`, claiming one force variable.
#[derive(Debug, Clone)]
pub struct ConstraintRow {
    /// Row classification.
    pub kind: ConstraintKind,
    /// Row of the constraint Jacobian (length = velocity count).
    pub jacobian: DVector<f64>,
    /// Target value for `jacobian · a` (stabilization terms included).
    pub rhs: f64,
}

/// Solution of an assembled dynamics problem.
///
/// Constraint forces are kept here for the solver layer and its tests; the
/// orchestrator surfaces only the acceleration.
#[derive(Debug, Clone)]
pub struct DynamicsSolution {
    /// Generalized acceleration (length = velocity count).
    pub acceleration: DVector<f64>,
    /// Constraint force variables, one per row, in insertion order.
    pub forces: DVector<f64>,
    /// Iterations used (zero for the direct path).
    pub iterations: usize,
    /// Residual norm at the returned solution.
    pub residual: f64,
}

/// Ephemeral per-evaluation arena for the constrained forward-dynamics
/// problem.
///
/// Rows are accumulated in order; each claims one force variable. The
/// equation of motion must be installed last, after every constraint row,
/// because its right-hand side couples to the stacked constraint Jacobian.
///
/// # Example
///
/// ```
/// use nalgebra::{dmatrix, dvector};
/// use rbd_constraint::DynamicsProblem;
///
/// let mut problem = DynamicsProblem::new(1);
/// problem.set_equation_of_motion(dmatrix![2.0], dvector![-4.0])?;
/// let solution = problem.solve(&rbd_types::SolverOptions::default())?;
/// assert!((solution.acceleration[0] - 2.0).abs() < 1e-9);
/// # Ok::<(), rbd_constraint::DynamicsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DynamicsProblem {
    nv: usize,
    rows: Vec<ConstraintRow>,
    equation_of_motion: Option<(DMatrix<f64>, DVector<f64>)>,
}

impl DynamicsProblem {
    /// Create an empty problem over `nv` acceleration variables.
    #[must_use]
    pub fn new(nv: usize) -> Self {
        Self {
            nv,
            rows: Vec::new(),
            equation_of_motion: None,
        }
    }

    /// Number of acceleration variables.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.nv
    }

    /// Number of constraint rows (equals the number of force variables).
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The accumulated rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[ConstraintRow] {
        &self.rows
    }

    /// Whether any row requires force projection (inequality or
    /// complementarity).
    #[must_use]
    pub fn has_inequalities(&self) -> bool {
        self.rows.iter().any(|row| !row.kind.is_equality())
    }

    /// Append one constraint row, returning its index.
    ///
    /// # Errors
    ///
    /// Fails with a dimension mismatch if the Jacobian row length disagrees
    /// with the velocity count, and with a configuration error if the
    /// equation of motion has already been installed (rows must come first).
    pub fn add_row(
        &mut self,
        kind: ConstraintKind,
        jacobian: DVector<f64>,
        rhs: f64,
    ) -> Result<usize> {
        if self.equation_of_motion.is_some() {
            return Err(DynamicsError::configuration(
                "constraint rows must be added before the equation of motion",
            ));
        }
        if jacobian.len() != self.nv {
            return Err(DynamicsError::dimension_mismatch(
                "constraint row jacobian",
                self.nv,
                jacobian.len(),
            ));
        }
        if let ConstraintKind::Friction { normal_row, .. } = kind {
            if normal_row >= self.rows.len() {
                return Err(DynamicsError::configuration(
                    "friction row references a normal row that does not exist yet",
                ));
            }
        }
        self.rows.push(ConstraintRow {
            kind,
            jacobian,
            rhs,
        });
        Ok(self.rows.len() - 1)
    }

    /// Append a block of equality rows (`jacobian * a = rhs`).
    ///
    /// # Errors
    ///
    /// Fails with a dimension mismatch if the block shapes disagree with
    /// the problem, or with a configuration error if the equation of motion
    /// is already installed.
    pub fn add_equality_block(
        &mut self,
        kind: ConstraintKind,
        jacobian: &DMatrix<f64>,
        rhs: &DVector<f64>,
    ) -> Result<()> {
        if jacobian.nrows() != rhs.len() {
            return Err(DynamicsError::dimension_mismatch(
                "equality block rhs",
                jacobian.nrows(),
                rhs.len(),
            ));
        }
        for i in 0..jacobian.nrows() {
            self.add_row(kind, jacobian.row(i).transpose(), rhs[i])?;
        }
        Ok(())
    }

    /// Install the equation of motion `H * a + C = J^T * f`. Must be called
    /// exactly once, after every constraint row.
    ///
    /// # Errors
    ///
    /// Fails with a dimension mismatch if `H` is not `nv x nv` or `C` is not
    /// length `nv`, and with a configuration error on a second call.
    pub fn set_equation_of_motion(
        &mut self,
        mass_matrix: DMatrix<f64>,
        bias: DVector<f64>,
    ) -> Result<()> {
        if self.equation_of_motion.is_some() {
            return Err(DynamicsError::configuration(
                "equation of motion already installed",
            ));
        }
        if mass_matrix.nrows() != self.nv || mass_matrix.ncols() != self.nv {
            return Err(DynamicsError::dimension_mismatch(
                "mass matrix",
                self.nv * self.nv,
                mass_matrix.nrows() * mass_matrix.ncols(),
            ));
        }
        if bias.len() != self.nv {
            return Err(DynamicsError::dimension_mismatch(
                "bias term",
                self.nv,
                bias.len(),
            ));
        }
        self.equation_of_motion = Some((mass_matrix, bias));
        Ok(())
    }

    /// The installed mass matrix and bias term.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if [`Self::set_equation_of_motion`]
    /// has not been called.
    pub(crate) fn equation_of_motion(&self) -> Result<(&DMatrix<f64>, &DVector<f64>)> {
        self.equation_of_motion
            .as_ref()
            .map(|(h, c)| (h, c))
            .ok_or_else(|| DynamicsError::configuration("equation of motion not installed"))
    }

    /// Vertically stacked constraint Jacobian (`num_rows x nv`).
    #[must_use]
    pub fn stacked_jacobian(&self) -> DMatrix<f64> {
        let mut j = DMatrix::zeros(self.rows.len(), self.nv);
        for (i, row) in self.rows.iter().enumerate() {
            j.row_mut(i).copy_from(&row.jacobian.transpose());
        }
        j
    }

    /// Stacked constraint right-hand side.
    #[must_use]
    pub fn stacked_rhs(&self) -> DVector<f64> {
        DVector::from_iterator(self.rows.len(), self.rows.iter().map(|row| row.rhs))
    }

    /// Solve the assembled problem, dispatching on its structure.
    ///
    /// Equality-only problems take the direct least-squares path; problems
    /// with inequality or complementarity rows take the projected
    /// Gauss-Seidel path.
    ///
    /// # Errors
    ///
    /// - [`DynamicsError::Infeasible`] if the constraint set is
    ///   inconsistent or the mass matrix is not positive-definite.
    /// - [`DynamicsError::DidNotConverge`] if the iterative path exhausts
    ///   its budget.
    /// - [`DynamicsError::Configuration`] if the equation of motion was
    ///   never installed.
    pub fn solve(&self, options: &SolverOptions) -> Result<DynamicsSolution> {
        if self.nv == 0 {
            return Ok(DynamicsSolution {
                acceleration: DVector::zeros(0),
                forces: DVector::zeros(self.rows.len()),
                iterations: 0,
                residual: 0.0,
            });
        }
        if self.has_inequalities() {
            tracing::debug!(
                rows = self.rows.len(),
                nv = self.nv,
                "dispatching to projected Gauss-Seidel"
            );
            pgs::solve(self, options)
        } else {
            tracing::debug!(
                rows = self.rows.len(),
                nv = self.nv,
                "dispatching to direct least-squares"
            );
            direct::solve(self, options)
        }
    }
}
