//! Compliant contact model parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical parameters for the compliant contact model.
///
/// Normal force grows with penetration depth scaled by the stiffness and is
/// damped against the relative normal velocity; tangential friction is bounded
/// by `friction_coefficient * normal_force` (Coulomb-style).
///
/// These are read-mostly knobs on the system orchestrator: set them up before
/// simulation, read them on every evaluation.
///
/// # Example
///
/// ```
/// use rbd_types::ContactParams;
///
/// let params = ContactParams::default()
///     .with_penetration_stiffness(300.0)
///     .with_friction(0.7);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactParams {
    /// Penetration stiffness `k` (N/m).
    ///
    /// Normal force per unit penetration depth. Higher values allow less
    /// penetration but stiffen the resulting differential equations.
    pub penetration_stiffness: f64,

    /// Penetration damping `b` (N·s/m).
    ///
    /// Dissipates energy against the relative normal velocity.
    pub penetration_damping: f64,

    /// Coulomb friction coefficient `mu` (dimensionless).
    ///
    /// Maximum tangential force = `mu * normal_force`.
    /// - 0.0 = frictionless
    /// - 0.3-0.5 = typical materials
    /// - ~1.0 = rubber, high friction
    pub friction_coefficient: f64,

    /// Model every simultaneous contact point independently.
    ///
    /// When false, the contact query reduces simultaneous points to a
    /// dominant one. The enumeration/selection policy belongs to the
    /// external contact-detection collaborator.
    pub use_multi_contact: bool,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            penetration_stiffness: 150.0,
            penetration_damping: 15.0, // stiffness / 10
            friction_coefficient: 1.0,
            use_multi_contact: false,
        }
    }
}

impl ContactParams {
    /// Soft contact: permits visible penetration, easy on integrators.
    #[must_use]
    pub fn soft() -> Self {
        Self {
            penetration_stiffness: 50.0,
            penetration_damping: 5.0,
            friction_coefficient: 1.0,
            use_multi_contact: false,
        }
    }

    /// Stiff contact: small penetration, needs small integration steps.
    #[must_use]
    pub fn stiff() -> Self {
        Self {
            penetration_stiffness: 1500.0,
            penetration_damping: 150.0,
            friction_coefficient: 1.0,
            use_multi_contact: false,
        }
    }

    /// Frictionless contact (ice-like).
    #[must_use]
    pub fn frictionless() -> Self {
        Self {
            friction_coefficient: 0.0,
            ..Default::default()
        }
    }

    /// Set the penetration stiffness.
    #[must_use]
    pub fn with_penetration_stiffness(mut self, stiffness: f64) -> Self {
        self.penetration_stiffness = stiffness;
        self
    }

    /// Set the penetration damping.
    #[must_use]
    pub fn with_penetration_damping(mut self, damping: f64) -> Self {
        self.penetration_damping = damping;
        self
    }

    /// Set the friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction_coefficient = friction;
        self
    }

    /// Enable or disable multi-contact modeling.
    #[must_use]
    pub fn with_multi_contact(mut self, enabled: bool) -> Self {
        self.use_multi_contact = enabled;
        self
    }

    /// Validate the parameters are physically reasonable.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first out-of-range field.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.penetration_stiffness <= 0.0 || !self.penetration_stiffness.is_finite() {
            return Err("penetration_stiffness must be positive and finite");
        }
        if self.penetration_damping < 0.0 || !self.penetration_damping.is_finite() {
            return Err("penetration_damping cannot be negative");
        }
        if self.friction_coefficient < 0.0 || !self.friction_coefficient.is_finite() {
            return Err("friction_coefficient cannot be negative");
        }
        Ok(())
    }
}
