//! The kinematics-provider seam.
//!
//! The forward-dynamics core never owns a kinematic tree. It talks to one
//! through [`KinematicsModel`], whose associated `Cache` type is an opaque,
//! per-evaluation snapshot built from `(q, v)`. Concrete providers (URDF- or
//! MJCF-backed trees, test fixtures) live outside this crate.

use nalgebra::{DMatrix, DVector, DVectorView, Isometry3, Vector3, Vector6};

/// Identifier of a named reference frame within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    /// The world frame, by convention index 0.
    pub const WORLD: FrameId = FrameId(0);
}

/// Spatial Jacobian of a frame, restricted to the velocity indices on the
/// kinematic path from the world to that frame.
///
/// Rows are ordered angular-on-top: the column for path index `k` maps
/// `v[v_indices[k]]` to `[omega; v_linear]` of the frame.
#[derive(Debug, Clone)]
pub struct FrameJacobian {
    /// 6 x `v_indices.len()` spatial Jacobian block.
    pub matrix: DMatrix<f64>,
    /// Velocity indices touched by the kinematic path, matching the block
    /// columns in order.
    pub v_indices: Vec<usize>,
}

impl FrameJacobian {
    /// A Jacobian touching no velocity indices (frame welded to the world).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            matrix: DMatrix::zeros(6, 0),
            v_indices: Vec::new(),
        }
    }

    /// Scatter a spatial force `[moment; force]` applied at the frame into
    /// the full velocity-indexed space: `tau[ind_k] = column_k . f_spatial`,
    /// zero outside the path.
    #[must_use]
    pub fn scatter_spatial_force(&self, f_spatial: &Vector6<f64>, nv: usize) -> DVector<f64> {
        let mut tau = DVector::zeros(nv);
        for (k, &ind) in self.v_indices.iter().enumerate() {
            if ind < nv {
                tau[ind] += self.matrix.column(k).dot(f_spatial);
            }
        }
        tau
    }
}

/// A block of equality constraints: value, Jacobian with respect to `v`,
/// and the Jacobian-dot-times-v bias.
#[derive(Debug, Clone)]
pub struct EqualityConstraints {
    /// Constraint values (violations); the constraint is `value = 0`.
    pub value: DVector<f64>,
    /// `m x nv` constraint Jacobian.
    pub jacobian: DMatrix<f64>,
    /// `Jdot * v` bias, length `m`.
    pub jdot_v: DVector<f64>,
}

impl EqualityConstraints {
    /// An empty block over `nv` velocities.
    #[must_use]
    pub fn empty(nv: usize) -> Self {
        Self {
            value: DVector::zeros(0),
            jacobian: DMatrix::zeros(0, nv),
            jdot_v: DVector::zeros(0),
        }
    }

    /// Number of constraint rows in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the block has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.len() == 0
    }
}

/// Limit record for a single-dof joint.
#[derive(Debug, Clone, Copy)]
pub struct JointLimit {
    /// Index of the joint's position coordinate.
    pub q_index: usize,
    /// Index of the joint's velocity coordinate.
    pub v_index: usize,
    /// Lower position bound.
    pub lower: f64,
    /// Upper position bound.
    pub upper: f64,
}

/// One contact point reported by the model's contact query.
#[derive(Debug, Clone)]
pub struct ContactPoint {
    /// Signed distance along the normal; negative means penetration.
    pub distance: f64,
    /// Unit contact normal, expressed in the world frame.
    pub normal: Vector3<f64>,
    /// `3 x nv` relative point Jacobian in world coordinates: maps `v` to
    /// the relative velocity of the two touching points.
    pub jacobian: DMatrix<f64>,
}

/// A kinematic model of an articulated multi-body system.
///
/// Implementations own the body/joint topology and all tree algorithms
/// (mass matrix, bias, Jacobians, forward kinematics). The dynamics core
/// calls [`Self::kinematics`] once per evaluation and reads everything else
/// through the resulting cache.
///
/// Constraint-set, limit, and contact queries default to empty so simple
/// providers stay small. Frame queries default to "no frames".
pub trait KinematicsModel {
    /// Per-evaluation kinematics snapshot derived from `(q, v)`.
    type Cache;

    /// Number of generalized position coordinates.
    fn num_positions(&self) -> usize;

    /// Number of generalized velocity coordinates.
    fn num_velocities(&self) -> usize;

    /// Number of actuator inputs (columns of the actuation map).
    fn num_actuators(&self) -> usize {
        0
    }

    /// Nominal configuration used to build the default initial state.
    fn nominal_configuration(&self) -> DVector<f64> {
        DVector::zeros(self.num_positions())
    }

    /// Build the kinematics cache for `(q, v)`. Callers guarantee the
    /// argument lengths match the declared counts.
    fn kinematics(&self, q: DVectorView<'_, f64>, v: DVectorView<'_, f64>) -> Self::Cache;

    /// The position snapshot stored in the cache.
    fn positions<'a>(&self, cache: &'a Self::Cache) -> &'a DVector<f64>;

    /// The velocity snapshot stored in the cache.
    fn velocities<'a>(&self, cache: &'a Self::Cache) -> &'a DVector<f64>;

    /// Positive-definite mass matrix `H`, `nv x nv`.
    fn mass_matrix(&self, cache: &Self::Cache) -> DMatrix<f64>;

    /// Bias term `C` (Coriolis, centrifugal, gravity): the dynamics are
    /// `H * a + C = tau`.
    fn bias_term(&self, cache: &Self::Cache) -> DVector<f64>;

    /// Actuation map `B`, `nv x num_actuators`; actuator inputs enter the
    /// dynamics as `tau = B * u`.
    fn actuation_map(&self, cache: &Self::Cache) -> DMatrix<f64> {
        let _ = cache;
        DMatrix::zeros(self.num_velocities(), self.num_actuators())
    }

    /// Map the cached velocity to the position derivative `qdot`.
    ///
    /// Defaults to the identity map, valid whenever positions and
    /// velocities share a parameterization.
    fn velocity_to_qdot(&self, cache: &Self::Cache) -> DVector<f64> {
        self.velocities(cache).clone()
    }

    /// Look up a frame by name.
    fn find_frame(&self, name: &str) -> Option<FrameId> {
        let _ = name;
        None
    }

    /// Pose of `frame` expressed in `expressed_in`.
    fn frame_transform(
        &self,
        cache: &Self::Cache,
        frame: FrameId,
        expressed_in: FrameId,
    ) -> Isometry3<f64> {
        let _ = (cache, frame, expressed_in);
        Isometry3::identity()
    }

    /// Spatial Jacobian of `frame` relative to the world, expressed in
    /// `frame`, restricted to the velocity indices on its kinematic path.
    fn frame_jacobian(&self, cache: &Self::Cache, frame: FrameId) -> FrameJacobian {
        let _ = (cache, frame);
        FrameJacobian::empty()
    }

    /// `3 x nv` Jacobian of the origin of `frame`, measured and expressed
    /// in `expressed_in`.
    fn point_jacobian(
        &self,
        cache: &Self::Cache,
        frame: FrameId,
        expressed_in: FrameId,
    ) -> DMatrix<f64> {
        let _ = (cache, frame, expressed_in);
        DMatrix::zeros(3, self.num_velocities())
    }

    /// Position-level (holonomic) equality constraints.
    fn position_constraints(&self, cache: &Self::Cache) -> EqualityConstraints {
        let _ = cache;
        EqualityConstraints::empty(self.num_velocities())
    }

    /// Velocity-level equality constraints.
    fn velocity_constraints(&self, cache: &Self::Cache) -> EqualityConstraints {
        let _ = cache;
        EqualityConstraints::empty(self.num_velocities())
    }

    /// Limit records for single-dof joints.
    fn joint_limits(&self) -> Vec<JointLimit> {
        Vec::new()
    }

    /// Active contact points for the cached configuration. When
    /// `multi_contact` is false the query reduces simultaneous points to a
    /// dominant one; the selection policy belongs to the provider.
    fn contacts(&self, cache: &Self::Cache, multi_contact: bool) -> Vec<ContactPoint> {
        let _ = (cache, multi_contact);
        Vec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    #[test]
    fn test_scatter_spatial_force_touches_only_path_indices() {
        // One path index (2), linear z row carries the force.
        let jac = FrameJacobian {
            matrix: dmatrix![0.0; 0.0; 0.0; 0.0; 0.0; 1.0],
            v_indices: vec![2],
        };
        let f = Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 3.0);
        let tau = jac.scatter_spatial_force(&f, 4);
        assert_relative_eq!(tau[2], 3.0);
        assert_eq!(tau[0], 0.0);
        assert_eq!(tau[1], 0.0);
        assert_eq!(tau[3], 0.0);
    }

    #[test]
    fn test_empty_constraint_block() {
        let block = EqualityConstraints::empty(5);
        assert!(block.is_empty());
        assert_eq!(block.len(), 0);
        assert_eq!(block.jacobian.ncols(), 5);
    }
}
