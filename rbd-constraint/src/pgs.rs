//! Projected Gauss-Seidel path for problems with inequality rows.
//!
//! The acceleration is eliminated through a Cholesky factorization of the
//! mass matrix, leaving the constraint-space system
//!
//! ```text
//! A * f = rhs,    A = J * H^-1 * J^T + regularization * I
//! rhs = b + J * H^-1 * C
//! ```
//!
//! which Gauss-Seidel sweeps solve with a per-row projection of the force:
//! equality rows are unprojected, joint-limit and contact-normal forces are
//! clamped non-negative, and friction forces are clamped to the box
//! `[-mu * f_normal, +mu * f_normal]` (the linear approximation of the
//! Coulomb cone). The acceleration is recovered afterwards as
//! `a = H^-1 * (J^T * f - C)`.

use nalgebra::{Cholesky, DMatrix, DVector};
use rbd_types::{DynamicsError, Result, SolverOptions};

use crate::problem::{ConstraintKind, DynamicsProblem, DynamicsSolution};

/// Diagonal entries below this are treated as degenerate and skipped.
const MIN_DIAGONAL: f64 = 1e-15;

pub(crate) fn solve(problem: &DynamicsProblem, options: &SolverOptions) -> Result<DynamicsSolution> {
    let (h, c) = problem.equation_of_motion()?;
    let nv = problem.num_velocities();
    let nf = problem.num_rows();

    let chol = Cholesky::new(h.clone()).ok_or_else(|| {
        DynamicsError::infeasible("mass matrix is not positive-definite")
    })?;

    if nf == 0 {
        return Ok(DynamicsSolution {
            acceleration: chol.solve(&(-c)),
            forces: DVector::zeros(0),
            iterations: 0,
            residual: 0.0,
        });
    }

    let j = problem.stacked_jacobian();
    let b = problem.stacked_rhs();

    let hinv_jt = chol.solve(&j.transpose());
    let mut a = &j * &hinv_jt;
    for i in 0..nf {
        a[(i, i)] += options.regularization;
    }
    let rhs = &b + &j * chol.solve(c);

    let kinds: Vec<ConstraintKind> = problem.rows().iter().map(|row| row.kind).collect();
    let mut lambda = DVector::<f64>::zeros(nf);

    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    let mut converged = false;

    for _ in 0..options.max_iterations {
        iterations += 1;

        for i in 0..nf {
            let a_ii = a[(i, i)];
            if a_ii.abs() < MIN_DIAGONAL {
                continue;
            }
            let mut sum = 0.0;
            for k in 0..nf {
                if k != i {
                    sum += a[(i, k)] * lambda[k];
                }
            }
            let projected = project(kinds[i], (rhs[i] - sum) / a_ii, &lambda);
            lambda[i] = projected;
        }

        residual = projected_residual(&a, &rhs, &lambda, &kinds);
        if !residual.is_finite() {
            return Err(DynamicsError::infeasible(
                "iterative solve diverged (non-finite iterate)",
            ));
        }
        if residual < options.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::warn!(
            iterations,
            residual,
            tolerance = options.tolerance,
            "projected Gauss-Seidel exhausted its iteration budget"
        );
        return Err(DynamicsError::DidNotConverge {
            iterations,
            residual,
            tolerance: options.tolerance,
        });
    }

    let acceleration = chol.solve(&(j.transpose() * &lambda - c));
    Ok(DynamicsSolution {
        acceleration,
        forces: lambda,
        iterations,
        residual,
    })
}

/// Project a candidate force onto its admissible set.
fn project(kind: ConstraintKind, value: f64, lambda: &DVector<f64>) -> f64 {
    match kind {
        ConstraintKind::PositionEquality | ConstraintKind::VelocityEquality => value,
        ConstraintKind::JointLimit | ConstraintKind::ContactNormal => value.max(0.0),
        ConstraintKind::Friction { normal_row, mu } => {
            let bound = mu * lambda[normal_row].max(0.0);
            value.clamp(-bound, bound)
        }
    }
}

/// Natural-map residual: for each row, how far the current force is from
/// the fixed point of its projected update. Plain `rhs - A*lambda` would
/// never vanish on rows held at their bounds.
fn projected_residual(
    a: &DMatrix<f64>,
    rhs: &DVector<f64>,
    lambda: &DVector<f64>,
    kinds: &[ConstraintKind],
) -> f64 {
    let raw = rhs - a * lambda;
    let mut norm_sq = 0.0;
    for i in 0..lambda.len() {
        let fixed_point = project(kinds[i], lambda[i] + raw[i], lambda);
        let r = lambda[i] - fixed_point;
        norm_sq += r * r;
    }
    norm_sq.sqrt()
}
