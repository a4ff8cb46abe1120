//! Propeller force element.

use nalgebra::{DVector, Vector3, Vector6};
use rbd_types::{DynamicsError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::ForceElement;
use crate::model::{FrameId, KinematicsModel};

/// Configuration record for a [`Propeller`], the numeric payload of a
/// description-document node. Parsing the document itself is out of scope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropellerConfig {
    /// Name of the reference frame the propeller acts at.
    pub frame: String,
    /// Spin axis in frame coordinates; normalized at construction.
    pub axis: [f64; 3],
    /// Scale factor between the input and thrust along the axis.
    pub thrust_scale: f64,
    /// Scale factor between the input and the aerodynamic drag moment.
    pub moment_scale: f64,
    /// Optional lower bound on the commanded input.
    pub lower_limit: Option<f64>,
    /// Optional upper bound on the commanded input.
    pub upper_limit: Option<f64>,
}

/// Models the thrust and drag moment of a simple propeller.
///
/// The single input is clamped to the configured limits, scaled into a
/// spatial force/moment pair along the axis, and scattered through the
/// frame's path-restricted Jacobian: only velocity indices on the kinematic
/// path from the world to the frame receive a contribution.
#[derive(Debug, Clone)]
pub struct Propeller {
    name: String,
    frame: FrameId,
    axis: Vector3<f64>,
    thrust_scale: f64,
    moment_scale: f64,
    lower_limit: f64,
    upper_limit: f64,
}

impl Propeller {
    /// Build a propeller from its configuration record, resolving the frame
    /// name against the model.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the frame is unknown, the axis
    /// is degenerate, or the limits are inverted.
    pub fn from_config<M: KinematicsModel>(
        model: &M,
        config: &PropellerConfig,
        name: impl Into<String>,
    ) -> Result<Self> {
        let frame = model.find_frame(&config.frame).ok_or_else(|| {
            DynamicsError::configuration(format!("unknown propeller frame '{}'", config.frame))
        })?;

        let axis = Vector3::new(config.axis[0], config.axis[1], config.axis[2]);
        let norm = axis.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(DynamicsError::configuration(
                "propeller axis must be a nonzero finite vector",
            ));
        }

        let lower_limit = config.lower_limit.unwrap_or(f64::NEG_INFINITY);
        let upper_limit = config.upper_limit.unwrap_or(f64::INFINITY);
        if lower_limit > upper_limit {
            return Err(DynamicsError::configuration(
                "propeller input limits are inverted",
            ));
        }

        Ok(Self {
            name: name.into(),
            frame,
            axis: axis / norm,
            thrust_scale: config.thrust_scale,
            moment_scale: config.moment_scale,
            lower_limit,
            upper_limit,
        })
    }

    /// The resolved frame this propeller acts at.
    #[must_use]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// The normalized spin axis in frame coordinates.
    #[must_use]
    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }
}

impl<M: KinematicsModel> ForceElement<M> for Propeller {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn generalized_force(
        &self,
        _t: f64,
        u: &[f64],
        model: &M,
        cache: &M::Cache,
    ) -> Result<DVector<f64>> {
        let input = u
            .first()
            .copied()
            .unwrap_or(0.0)
            .clamp(self.lower_limit, self.upper_limit);

        let mut f_spatial = Vector6::zeros();
        f_spatial
            .fixed_rows_mut::<3>(0)
            .copy_from(&(self.moment_scale * input * self.axis));
        f_spatial
            .fixed_rows_mut::<3>(3)
            .copy_from(&(self.thrust_scale * input * self.axis));

        let jacobian = model.frame_jacobian(cache, self.frame);
        Ok(jacobian.scatter_spatial_force(&f_spatial, model.num_velocities()))
    }
}
