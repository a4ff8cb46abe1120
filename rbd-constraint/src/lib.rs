//! Constraint problem assembly and solvers for rigid-body forward dynamics.
//!
//! Forward dynamics is posed per evaluation as a constrained feasibility
//! problem over the stacked unknown `[a; f]` (acceleration plus one force
//! variable per constraint row):
//!
//! ```text
//! find a, f
//! subject to
//!     J_k * a = b_k          for each constraint row k (equality or bound)
//!     H * a + C = J^T * f    equation of motion, added last
//! ```
//!
//! The [`DynamicsProblem`] arena accumulates constraint rows incrementally;
//! each row claims one force variable, and the equation of motion is
//! installed last so its right-hand side can reference the fully stacked
//! constraint Jacobian.
//!
//! # Solver dispatch
//!
//! [`DynamicsProblem::solve`] inspects the assembled structure:
//!
//! - **Equality-only** problems go to the direct path: one SVD-based
//!   least-squares solve over `[a; f]`, minimum-norm when under-determined.
//! - Problems with **inequality/complementarity rows** (joint limits,
//!   contact) go to a projected Gauss-Seidel iteration on the
//!   constraint-space system `(J * H^-1 * J^T) * f = rhs` with per-kind
//!   projection of the forces.
//!
//! Problems are never persisted across evaluations; build, solve, discard.

#![doc(html_root_url = "https://docs.rs/rbd-constraint/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]

mod direct;
mod pgs;
mod problem;

pub use problem::{ConstraintKind, ConstraintRow, DynamicsProblem, DynamicsSolution};

pub use rbd_types::{DynamicsError, Result};
