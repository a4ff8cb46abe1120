//! Direct least-squares path for equality-only problems.
//!
//! Stacks every constraint row and the equation of motion into one linear
//! system over `[a; f]` and solves it with an SVD, which yields the
//! minimum-norm solution when the system is under-determined (the implicit
//! objective of the feasibility formulation). An inconsistent constraint
//! set shows up as a residual the least-squares solution cannot drive to
//! zero, and is reported as infeasible.

use nalgebra::{DMatrix, DVector};
use rbd_types::{DynamicsError, Result, SolverOptions};

use crate::problem::{DynamicsProblem, DynamicsSolution};

/// SVD cutoff for treating singular values as zero.
const SVD_EPS: f64 = 1e-12;

pub(crate) fn solve(problem: &DynamicsProblem, options: &SolverOptions) -> Result<DynamicsSolution> {
    let (h, c) = problem.equation_of_motion()?;
    let nv = problem.num_velocities();
    let nf = problem.num_rows();
    let n = nv + nf;

    // [ J   0  ] [a]   [ b]
    // [ H  -J^T] [f] = [-C]
    let mut lhs = DMatrix::zeros(nf + nv, n);
    let mut rhs = DVector::zeros(nf + nv);
    for (i, row) in problem.rows().iter().enumerate() {
        lhs.view_mut((i, 0), (1, nv))
            .copy_from(&row.jacobian.transpose());
        rhs[i] = row.rhs;
    }
    lhs.view_mut((nf, 0), (nv, nv)).copy_from(h);
    if nf > 0 {
        let jt = problem.stacked_jacobian().transpose();
        lhs.view_mut((nf, nv), (nv, nf)).copy_from(&(-jt));
    }
    rhs.rows_mut(nf, nv).copy_from(&(-c));

    let rhs_scale = 1.0 + rhs.norm();
    let svd = lhs.clone().svd(true, true);
    let x = svd
        .solve(&rhs, SVD_EPS)
        .map_err(DynamicsError::infeasible)?;

    let residual = (&lhs * &x - &rhs).norm();
    if !residual.is_finite() || residual > options.tolerance * rhs_scale {
        return Err(DynamicsError::infeasible_with_residual(
            "equality constraint set is inconsistent with the equations of motion",
            residual,
        ));
    }

    Ok(DynamicsSolution {
        acceleration: x.rows(0, nv).clone_owned(),
        forces: x.rows(nv, nf).clone_owned(),
        iterations: 0,
        residual,
    })
}
