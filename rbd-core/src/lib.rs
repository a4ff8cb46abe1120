//! Constrained forward dynamics for articulated rigid-body systems.
//!
//! Given generalized position/velocity and control inputs, this crate
//! computes the generalized acceleration, implicitly resolving the
//! constraint and contact forces needed to satisfy kinematic and contact
//! constraints. It is a right-hand-side evaluator for an outer
//! simulation/control loop; it never integrates trajectories itself.
//!
//! # Architecture
//!
//! - [`KinematicsModel`] is the seam to the external kinematics provider:
//!   it owns the topology and the tree algorithms (mass matrix, bias,
//!   Jacobians, forward kinematics) and builds an opaque per-evaluation
//!   cache from `(q, v)`.
//! - [`ForceElement`] implementations ([`Propeller`], [`SpringDamper`],
//!   or third-party kinds) turn their input slice and the cache into
//!   generalized-force contributions.
//! - The formulator assembles the constrained problem (position and
//!   velocity equality rows, joint limits, contact, equation of motion
//!   last) and dispatches through `rbd-constraint`.
//! - [`RigidBodySystem`] orchestrates: it owns the model handle and the
//!   element list and exposes `dynamics`/`output` plus sizing.
//!
//! # Example
//!
//! Evaluation per call: state in, state derivative out.
//!
//! ```ignore
//! let system = RigidBodySystem::from_model(model);
//! let x = system.initial_state();
//! let u = nalgebra::DVector::zeros(system.num_inputs());
//! let xdot = system.dynamics(0.0, &x, &u)?;
//! ```

#![doc(html_root_url = "https://docs.rs/rbd-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]

mod element;
mod formulation;
mod loader;
mod model;
mod propeller;
mod spring_damper;
mod system;

pub use element::ForceElement;
pub use loader::DescriptionLoader;
pub use model::{
    ContactPoint, EqualityConstraints, FrameId, FrameJacobian, JointLimit, KinematicsModel,
};
pub use propeller::{Propeller, PropellerConfig};
pub use spring_damper::{SpringDamper, SpringDamperConfig};
pub use system::RigidBodySystem;

pub use rbd_types::{
    ContactMode, ContactParams, DynamicsError, FloatingBaseType, Result, SolverOptions,
};
