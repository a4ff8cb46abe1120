//! Shared types for constrained rigid-body forward dynamics.
//!
//! This crate provides the foundational data types for the `rbd` workspace:
//!
//! - [`DynamicsError`] - The error enum shared by every layer
//! - [`ContactParams`] - Compliant contact model parameters
//! - [`SolverOptions`] - Constraint solver configuration
//! - [`FloatingBaseType`] - Floating-base joint parameterizations
//!
//! These types are **pure data**. They have no dynamics, no solvers, no
//! kinematics. They are the common language between:
//!
//! - The constraint/solver layer (`rbd-constraint`)
//! - The forward-dynamics core (`rbd-core`)
//! - External kinematics providers and description loaders
//!
//! # Example
//!
//! ```
//! use rbd_types::{ContactParams, SolverOptions};
//!
//! let contact = ContactParams::default().with_friction(0.8);
//! let options = SolverOptions::default().with_max_iterations(200);
//!
//! assert!(contact.validate().is_ok());
//! assert!(options.validate().is_ok());
//! ```

#![doc(html_root_url = "https://docs.rs/rbd-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]

mod base;
mod contact;
mod error;
mod options;

pub use base::FloatingBaseType;
pub use contact::ContactParams;
pub use error::DynamicsError;
pub use options::{ContactMode, SolverOptions};

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, DynamicsError>;
