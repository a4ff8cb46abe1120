//! Assembly of the constrained forward-dynamics problem.
//!
//! Builds the per-evaluation [`DynamicsProblem`] in stages: bias term,
//! actuation, force-element contributions, compliant joint-limit and
//! contact forces (folded into the bias), then constraint rows in order —
//! position equality, velocity equality, constraint-mode contact — with
//! the equation of motion installed last.

use nalgebra::{DVector, Matrix3, Vector3};
use rbd_constraint::{ConstraintKind, DynamicsProblem};
use rbd_types::{ContactMode, ContactParams, DynamicsError, Result, SolverOptions};

use crate::element::ForceElement;
use crate::model::{ContactPoint, KinematicsModel};

/// Regularizes the sliding direction when the tangential speed vanishes.
const SLIDING_EPS: f64 = 1e-9;

/// Formulate and solve the forward dynamics for one evaluation, returning
/// the generalized acceleration.
#[allow(clippy::too_many_arguments)]
pub(crate) fn compute_acceleration<M: KinematicsModel>(
    model: &M,
    cache: &M::Cache,
    u: &DVector<f64>,
    elements: &[Box<dyn ForceElement<M>>],
    contact_params: &ContactParams,
    options: &SolverOptions,
    t: f64,
) -> Result<DVector<f64>> {
    let nv = model.num_velocities();
    if nv == 0 {
        return Ok(DVector::zeros(0));
    }

    let v = model.velocities(cache);
    let q = model.positions(cache);
    let h = model.mass_matrix(cache);
    let mut c = model.bias_term(cache);
    if c.len() != nv {
        return Err(DynamicsError::dimension_mismatch("bias term", nv, c.len()));
    }

    // Actuator inputs occupy the head of the input vector: C -= B * u_act.
    let na = model.num_actuators();
    if na > 0 {
        let b = model.actuation_map(cache);
        c -= b * u.rows(0, na);
    }

    // Force elements consume the tail, in registration order.
    let mut offset = na;
    for element in elements {
        let arity = element.num_inputs();
        let local = u.as_slice().get(offset..offset + arity).unwrap_or(&[]);
        let tau = element.generalized_force(t, local, model, cache)?;
        if tau.len() != nv {
            return Err(DynamicsError::dimension_mismatch(
                format!("force element '{}' output", element.name()),
                nv,
                tau.len(),
            ));
        }
        c -= tau;
        offset += arity;
    }

    let mut problem = DynamicsProblem::new(nv);
    let alpha = options.stabilization_rate;

    // Joint limits: compliant spring-damper forces on violated single-dof
    // joints, using the penetration stiffness/damping knobs.
    let constraint_contact = options.contact_mode == ContactMode::Constraint;
    let k = contact_params.penetration_stiffness;
    let b_damp = contact_params.penetration_damping;
    for limit in model.joint_limits() {
        let qi = q[limit.q_index];
        let vi = v[limit.v_index];
        if constraint_contact {
            add_limit_rows(&mut problem, nv, &limit, qi, vi, alpha)?;
        } else if qi < limit.lower {
            c[limit.v_index] -= k * (limit.lower - qi) - b_damp * vi;
        } else if qi > limit.upper {
            c[limit.v_index] -= k * (limit.upper - qi) - b_damp * vi;
        }
    }

    // Contact: fold compliant forces into C, or emit complementarity rows.
    let contacts = model.contacts(cache, contact_params.use_multi_contact);
    if !contacts.is_empty() {
        tracing::debug!(
            num_contacts = contacts.len(),
            mode = ?options.contact_mode,
            "processing contact points"
        );
    }
    if constraint_contact {
        for point in &contacts {
            add_contact_rows(&mut problem, point, v, contact_params, alpha)?;
        }
    } else {
        for point in &contacts {
            fold_compliant_contact(&mut c, point, v, contact_params);
        }
    }

    // Position equality, differentiated twice, critically damped Baumgarte.
    let pos = model.position_constraints(cache);
    if !pos.is_empty() {
        let phidot = &pos.jacobian * v;
        let rhs = -&pos.jdot_v - 2.0 * alpha * phidot - alpha * alpha * &pos.value;
        problem.add_equality_block(ConstraintKind::PositionEquality, &pos.jacobian, &rhs)?;
    }

    // Velocity equality, differentiated once: psidot = -alpha * psi.
    let vel = model.velocity_constraints(cache);
    if !vel.is_empty() {
        let rhs = -&vel.jdot_v - alpha * &vel.value;
        problem.add_equality_block(ConstraintKind::VelocityEquality, &vel.jacobian, &rhs)?;
    }

    // Equation of motion last: its right-hand side couples to every row
    // added above through the stacked Jacobian transpose.
    problem.set_equation_of_motion(h, c)?;

    Ok(problem.solve(options)?.acceleration)
}

/// Unilateral rows for a violated joint limit. The row Jacobian is oriented
/// so the non-negative force variable pushes back inside the bounds.
fn add_limit_rows(
    problem: &mut DynamicsProblem,
    nv: usize,
    limit: &crate::model::JointLimit,
    qi: f64,
    vi: f64,
    alpha: f64,
) -> Result<()> {
    let (sign, violation) = if qi < limit.lower {
        (1.0, qi - limit.lower)
    } else if qi > limit.upper {
        (-1.0, limit.upper - qi)
    } else {
        return Ok(());
    };
    let mut row = DVector::zeros(nv);
    row[limit.v_index] = sign;
    // phi = sign * (q - bound) < 0 when violated; drive phidd to restore.
    let phidot = sign * vi;
    let rhs = -2.0 * alpha * phidot - alpha * alpha * violation;
    problem.add_row(ConstraintKind::JointLimit, row, rhs)?;
    Ok(())
}

/// Complementarity rows for one penetrating contact point: a normal row
/// plus two box-bounded friction rows in the tangent plane.
fn add_contact_rows(
    problem: &mut DynamicsProblem,
    point: &ContactPoint,
    v: &DVector<f64>,
    params: &ContactParams,
    alpha: f64,
) -> Result<()> {
    if point.distance > 0.0 {
        return Ok(());
    }
    let (t1, t2) = tangent_basis(&point.normal);

    let j_n = point.normal.transpose() * &point.jacobian;
    let j_t1 = t1.transpose() * &point.jacobian;
    let j_t2 = t2.transpose() * &point.jacobian;

    let w_n = (&j_n * v)[0];
    let rhs_n = -2.0 * alpha * w_n - alpha * alpha * point.distance;
    let normal_row = problem.add_row(ConstraintKind::ContactNormal, j_n.transpose(), rhs_n)?;

    let mu = params.friction_coefficient;
    for j_t in [j_t1, j_t2] {
        let w_t = (&j_t * v)[0];
        problem.add_row(
            ConstraintKind::Friction { normal_row, mu },
            j_t.transpose(),
            -alpha * w_t,
        )?;
    }
    Ok(())
}

/// Compliant contact law: normal force from the penetration spring-damper,
/// tangential force opposing the sliding velocity inside the friction cone,
/// folded into the bias term through the contact-point Jacobian.
fn fold_compliant_contact(
    c: &mut DVector<f64>,
    point: &ContactPoint,
    v: &DVector<f64>,
    params: &ContactParams,
) {
    let phi = point.distance;
    if phi > 0.0 {
        return;
    }
    let (t1, t2) = tangent_basis(&point.normal);
    let rotation = Matrix3::from_rows(&[t1.transpose(), t2.transpose(), point.normal.transpose()]);
    let j_c = rotation * &point.jacobian;
    let w = &j_c * v;

    let f_normal = -(params.penetration_stiffness * phi + params.penetration_damping * w[2]);
    if f_normal <= 0.0 {
        // Separating fast enough that the damper would pull; no adhesion.
        return;
    }

    let w_t = Vector3::new(w[0], w[1], 0.0);
    let slip = w_t.norm();
    let gain = params
        .penetration_damping
        .min(params.friction_coefficient * f_normal / (slip + SLIDING_EPS));
    let f_t = -gain * w_t;

    let f_point = Vector3::new(f_t[0], f_t[1], f_normal);
    *c -= j_c.transpose() * f_point;
}

/// An orthonormal tangent basis for a unit normal, with the degenerate
/// near-vertical normals handled explicitly.
fn tangent_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let t1 = if normal.z.abs() > 1.0 - 1e-6 {
        Vector3::x()
    } else {
        normal.cross(&Vector3::z()).normalize()
    };
    let t2 = normal.cross(&t1);
    (t1, t2)
}
