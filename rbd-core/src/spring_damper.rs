//! Spring-damper force element.

use nalgebra::DVector;
use rbd_types::{DynamicsError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::ForceElement;
use crate::model::{FrameId, KinematicsModel};

/// Guard against a zero-length connecting line.
const LENGTH_EPS: f64 = 1e-9;

/// Configuration record for a [`SpringDamper`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpringDamperConfig {
    /// Name of the first attachment frame.
    pub frame_a: String,
    /// Name of the second attachment frame.
    pub frame_b: String,
    /// Spring stiffness (N/m).
    pub stiffness: f64,
    /// Damping coefficient (N·s/m).
    pub damping: f64,
    /// Natural length of the spring (m).
    pub rest_length: f64,
}

/// A linear spring-damper acting along the line between two frames.
///
/// With `d` the origin of frame A expressed in frame B, `length = |d|` and
/// `dir = d / length`, the force magnitude is
/// `stiffness * (rest_length - length) - damping * rate`, where the
/// lengthening rate is the signed projection `dir . (J_rel * v)` of the
/// relative point velocity. The generalized force is
/// `J_rel^T * (magnitude * dir)`; because the relative point Jacobian
/// differentiates the full relative transform, the equal-and-opposite
/// reaction on the second frame's body is included automatically.
#[derive(Debug, Clone)]
pub struct SpringDamper {
    name: String,
    frame_a: FrameId,
    frame_b: FrameId,
    stiffness: f64,
    damping: f64,
    rest_length: f64,
}

impl SpringDamper {
    /// Build a spring-damper from its configuration record, resolving both
    /// frame names against the model.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if either frame is unknown or the
    /// numeric parameters are out of range.
    pub fn from_config<M: KinematicsModel>(
        model: &M,
        config: &SpringDamperConfig,
        name: impl Into<String>,
    ) -> Result<Self> {
        let frame_a = model.find_frame(&config.frame_a).ok_or_else(|| {
            DynamicsError::configuration(format!(
                "unknown spring-damper frame '{}'",
                config.frame_a
            ))
        })?;
        let frame_b = model.find_frame(&config.frame_b).ok_or_else(|| {
            DynamicsError::configuration(format!(
                "unknown spring-damper frame '{}'",
                config.frame_b
            ))
        })?;
        if config.stiffness < 0.0 || !config.stiffness.is_finite() {
            return Err(DynamicsError::configuration(
                "spring-damper stiffness cannot be negative",
            ));
        }
        if config.damping < 0.0 || !config.damping.is_finite() {
            return Err(DynamicsError::configuration(
                "spring-damper damping cannot be negative",
            ));
        }
        if config.rest_length < 0.0 || !config.rest_length.is_finite() {
            return Err(DynamicsError::configuration(
                "spring-damper rest length cannot be negative",
            ));
        }
        Ok(Self {
            name: name.into(),
            frame_a,
            frame_b,
            stiffness: config.stiffness,
            damping: config.damping,
            rest_length: config.rest_length,
        })
    }
}

impl<M: KinematicsModel> ForceElement<M> for SpringDamper {
    fn name(&self) -> &str {
        &self.name
    }

    fn generalized_force(
        &self,
        _t: f64,
        _u: &[f64],
        model: &M,
        cache: &M::Cache,
    ) -> Result<DVector<f64>> {
        let nv = model.num_velocities();
        let v = model.velocities(cache);

        let d = model
            .frame_transform(cache, self.frame_a, self.frame_b)
            .translation
            .vector;
        let length = d.norm();
        if length < LENGTH_EPS {
            // Coincident frames: the line direction is undefined, no force.
            return Ok(DVector::zeros(nv));
        }
        let dir = d / length;

        let j_rel = model.point_jacobian(cache, self.frame_a, self.frame_b);
        let rate = dir.dot(&(&j_rel * v));
        let magnitude = self.stiffness * (self.rest_length - length) - self.damping * rate;

        Ok(j_rel.transpose() * (magnitude * dir))
    }
}
