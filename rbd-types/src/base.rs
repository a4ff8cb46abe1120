//! Floating-base joint parameterizations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameterization of the joint connecting a free body to the world.
///
/// Passed to description loaders so the resulting model uses the requested
/// floating-base representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FloatingBaseType {
    /// The base is welded to the world (no floating degrees of freedom).
    Fixed,

    /// Unit-quaternion orientation: 7 positions, 6 velocities, no
    /// singularities. Position and velocity parameterizations differ, so
    /// the velocity-to-qdot map is non-trivial.
    #[default]
    QuaternionFloating,

    /// Roll-pitch-yaw orientation: 6 positions, 6 velocities, singular at
    /// pitch = +/-90 degrees but with a direct qdot correspondence.
    RollPitchYawFloating,
}

impl FloatingBaseType {
    /// Whether this base type contributes floating degrees of freedom.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}
