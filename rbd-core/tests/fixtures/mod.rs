//! Reusable fixture models for the dynamics tests.
//!
//! [`PointMassModel`] is a bank of independent point masses, each sliding
//! along a fixed axis, dressed up with optional frames, constraints,
//! limits, actuation, and a ground contact so every formulation path can
//! be exercised against closed-form expectations.

use nalgebra::{DMatrix, DVector, DVectorView, Isometry3, Translation3, Vector3};
use rbd_core::{
    ContactPoint, EqualityConstraints, FrameId, FrameJacobian, JointLimit, KinematicsModel,
};

/// A named frame riding on one degree of freedom.
struct Frame {
    name: String,
    dof: usize,
    axis: Vector3<f64>,
    offset: Vector3<f64>,
}

/// Bank of point masses on independent prismatic axes.
pub struct PointMassModel {
    masses: Vec<f64>,
    gravity_force: DVector<f64>,
    frames: Vec<Frame>,
    actuation: Option<DMatrix<f64>>,
    position_constraint: Option<(DVector<f64>, f64)>,
    velocity_constraint: Option<DVector<f64>>,
    limits: Vec<JointLimit>,
    ground_contact_dof: Option<usize>,
    nominal: DVector<f64>,
}

/// Snapshot cache: just the state; the fixture recomputes everything else
/// on demand.
pub struct PointMassCache {
    q: DVector<f64>,
    v: DVector<f64>,
}

impl PointMassModel {
    pub fn new(masses: &[f64]) -> Self {
        let n = masses.len();
        Self {
            masses: masses.to_vec(),
            gravity_force: DVector::zeros(n),
            frames: Vec::new(),
            actuation: None,
            position_constraint: None,
            velocity_constraint: None,
            limits: Vec::new(),
            ground_contact_dof: None,
            nominal: DVector::zeros(n),
        }
    }

    /// Constant generalized force (e.g. gravity) applied to every
    /// evaluation; enters the bias as `C = -force`.
    pub fn with_gravity_force(mut self, force: &[f64]) -> Self {
        self.gravity_force = DVector::from_row_slice(force);
        self
    }

    /// Attach a named frame to a dof, translating along `axis` with an
    /// `offset` at q = 0.
    pub fn with_frame(
        mut self,
        name: &str,
        dof: usize,
        axis: Vector3<f64>,
        offset: Vector3<f64>,
    ) -> Self {
        self.frames.push(Frame {
            name: name.to_string(),
            dof,
            axis,
            offset,
        });
        self
    }

    /// Actuation map `B`.
    pub fn with_actuation(mut self, b: DMatrix<f64>) -> Self {
        self.actuation = Some(b);
        self
    }

    /// Linear holonomic constraint `coeffs . q = target`.
    pub fn with_position_constraint(mut self, coeffs: &[f64], target: f64) -> Self {
        self.position_constraint = Some((DVector::from_row_slice(coeffs), target));
        self
    }

    /// Linear velocity constraint `coeffs . v = 0`.
    pub fn with_velocity_constraint(mut self, coeffs: &[f64]) -> Self {
        self.velocity_constraint = Some(DVector::from_row_slice(coeffs));
        self
    }

    /// Position limits on a single dof.
    pub fn with_limit(mut self, dof: usize, lower: f64, upper: f64) -> Self {
        self.limits.push(JointLimit {
            q_index: dof,
            v_index: dof,
            lower,
            upper,
        });
        self
    }

    /// A ground plane at q = 0 below the given dof (axis must be vertical).
    pub fn with_ground_contact(mut self, dof: usize) -> Self {
        self.ground_contact_dof = Some(dof);
        self
    }

    /// Nominal configuration for the initial state.
    pub fn with_nominal(mut self, q: &[f64]) -> Self {
        self.nominal = DVector::from_row_slice(q);
        self
    }
}

impl KinematicsModel for PointMassModel {
    type Cache = PointMassCache;

    fn num_positions(&self) -> usize {
        self.masses.len()
    }

    fn num_velocities(&self) -> usize {
        self.masses.len()
    }

    fn num_actuators(&self) -> usize {
        self.actuation.as_ref().map_or(0, DMatrix::ncols)
    }

    fn nominal_configuration(&self) -> DVector<f64> {
        self.nominal.clone()
    }

    fn kinematics(&self, q: DVectorView<'_, f64>, v: DVectorView<'_, f64>) -> Self::Cache {
        PointMassCache {
            q: q.clone_owned(),
            v: v.clone_owned(),
        }
    }

    fn positions<'a>(&self, cache: &'a Self::Cache) -> &'a DVector<f64> {
        &cache.q
    }

    fn velocities<'a>(&self, cache: &'a Self::Cache) -> &'a DVector<f64> {
        &cache.v
    }

    fn mass_matrix(&self, _cache: &Self::Cache) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(&self.masses))
    }

    fn bias_term(&self, _cache: &Self::Cache) -> DVector<f64> {
        -self.gravity_force.clone()
    }

    fn actuation_map(&self, _cache: &Self::Cache) -> DMatrix<f64> {
        self.actuation
            .clone()
            .unwrap_or_else(|| DMatrix::zeros(self.num_velocities(), 0))
    }

    fn find_frame(&self, name: &str) -> Option<FrameId> {
        self.frames
            .iter()
            .position(|frame| frame.name == name)
            .map(|i| FrameId(i + 1))
    }

    fn frame_transform(
        &self,
        cache: &Self::Cache,
        frame: FrameId,
        expressed_in: FrameId,
    ) -> Isometry3<f64> {
        let world_pos = |id: FrameId| -> Vector3<f64> {
            if id == FrameId::WORLD {
                Vector3::zeros()
            } else {
                let f = &self.frames[id.0 - 1];
                f.offset + f.axis * cache.q[f.dof]
            }
        };
        // Frames never rotate in this fixture.
        Isometry3::from_parts(
            Translation3::from(world_pos(frame) - world_pos(expressed_in)),
            nalgebra::UnitQuaternion::identity(),
        )
    }

    fn frame_jacobian(&self, _cache: &Self::Cache, frame: FrameId) -> FrameJacobian {
        if frame == FrameId::WORLD {
            return FrameJacobian::empty();
        }
        let f = &self.frames[frame.0 - 1];
        let mut matrix = DMatrix::zeros(6, 1);
        matrix.view_mut((3, 0), (3, 1)).copy_from(&f.axis);
        FrameJacobian {
            matrix,
            v_indices: vec![f.dof],
        }
    }

    fn point_jacobian(
        &self,
        _cache: &Self::Cache,
        frame: FrameId,
        expressed_in: FrameId,
    ) -> DMatrix<f64> {
        let mut j = DMatrix::zeros(3, self.num_velocities());
        if frame != FrameId::WORLD {
            let f = &self.frames[frame.0 - 1];
            let mut col = j.column_mut(f.dof);
            col += f.axis;
        }
        if expressed_in != FrameId::WORLD {
            let f = &self.frames[expressed_in.0 - 1];
            let mut col = j.column_mut(f.dof);
            col -= f.axis;
        }
        j
    }

    fn position_constraints(&self, cache: &Self::Cache) -> EqualityConstraints {
        match &self.position_constraint {
            None => EqualityConstraints::empty(self.num_velocities()),
            Some((coeffs, target)) => EqualityConstraints {
                value: DVector::from_element(1, coeffs.dot(&cache.q) - target),
                jacobian: DMatrix::from_rows(&[coeffs.transpose()]),
                jdot_v: DVector::zeros(1),
            },
        }
    }

    fn velocity_constraints(&self, cache: &Self::Cache) -> EqualityConstraints {
        match &self.velocity_constraint {
            None => EqualityConstraints::empty(self.num_velocities()),
            Some(coeffs) => EqualityConstraints {
                value: DVector::from_element(1, coeffs.dot(&cache.v)),
                jacobian: DMatrix::from_rows(&[coeffs.transpose()]),
                jdot_v: DVector::zeros(1),
            },
        }
    }

    fn joint_limits(&self) -> Vec<JointLimit> {
        self.limits.clone()
    }

    fn contacts(&self, cache: &Self::Cache, _multi_contact: bool) -> Vec<ContactPoint> {
        let Some(dof) = self.ground_contact_dof else {
            return Vec::new();
        };
        if cache.q[dof] > 0.0 {
            return Vec::new();
        }
        let mut jacobian = DMatrix::zeros(3, self.num_velocities());
        jacobian[(2, dof)] = 1.0;
        vec![ContactPoint {
            distance: cache.q[dof],
            normal: Vector3::z(),
            jacobian,
        }]
    }
}
