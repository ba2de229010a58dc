// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Impulse resolution between two bodies.
//!
//! Conventions: the normal points from body 1 towards body 2, the relative
//! velocity is `v₁(p) − v₂(p)`, and the solved impulse `J` is applied as
//! `+J` to body 1 and `−J` to body 2. A positive `v_rel · n` means the
//! bodies are approaching.

use tracing::trace;
use xpbd_core::body::Body;
use xpbd_core::math::{Mat3, Vec3};
use xpbd_geom::narrow::{Contact, ContactSource};

use crate::config::{ContactPointModel, SimConfig};

/// Floor added to the tangential speed in the friction ratio.
pub const FRICTION_EPSILON: f32 = 1e-6;

/// Restitution and friction for one contact.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Response {
    /// Bounce coefficient in `[0, 1]`.
    pub restitution: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Approach speeds below this get no bounce.
    pub restitution_threshold: f32,
}

impl Response {
    /// Body-to-body response from `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            restitution: config.restitution,
            friction: config.friction,
            restitution_threshold: config.restitution_threshold,
        }
    }

    /// Same friction and threshold with a different bounce.
    pub fn with_restitution(self, restitution: f32) -> Self {
        Self {
            restitution,
            ..self
        }
    }
}

/// Mass view of one side of a contact.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Side {
    /// Inverse mass (zero when immovable).
    pub inverse_mass: f32,
    /// World-space inverse inertia (zero when immovable).
    pub inverse_inertia: Mat3,
    /// Contact point relative to the body origin, world frame.
    pub lever: Vec3,
}

impl Side {
    /// Captures `body`'s mass properties for a contact at `point`.
    pub fn of(body: &Body, point: &Vec3) -> Self {
        Self {
            inverse_mass: body.inverse_mass(),
            inverse_inertia: body.world_inverse_inertia(),
            lever: *point - body.position(),
        }
    }

    /// An immovable side; contributes nothing to the effective mass.
    pub fn immovable() -> Self {
        Self {
            inverse_mass: 0.0,
            inverse_inertia: Mat3::ZERO,
            lever: Vec3::ZERO,
        }
    }

    fn compliance(&self) -> Mat3 {
        let skew = Mat3::skew(&self.lever);
        Mat3::identity().scale(self.inverse_mass) - skew * self.inverse_inertia * skew
    }
}

/// `K = (1/m₁ + 1/m₂)·E − [r₁]ₓ I₁⁻¹ [r₁]ₓ − [r₂]ₓ I₂⁻¹ [r₂]ₓ`.
pub fn effective_mass(a: &Side, b: &Side) -> Mat3 {
    a.compliance() + b.compliance()
}

/// Desired post-contact relative velocity.
///
/// The normal part is reversed and scaled by restitution; the tangential
/// part is scaled by `max(1 − μ(1+e)|v_N| / |v_T|, 0)`.
pub fn target_velocity(v_rel: &Vec3, normal: &Vec3, response: &Response) -> Vec3 {
    let v_n = normal.scale(v_rel.dot(normal));
    let v_t = *v_rel - v_n;
    let e = if v_n.length() < response.restitution_threshold {
        0.0
    } else {
        response.restitution
    };
    let a = (1.0 - response.friction * (1.0 + e) * v_n.length() / (v_t.length() + FRICTION_EPSILON))
        .max(0.0);
    v_t.scale(a) - v_n.scale(e)
}

/// Impulse that takes `v_rel` to [`target_velocity`].
///
/// `None` when the bodies are already separating along `normal`, or when the
/// effective-mass matrix cannot be inverted.
pub fn solve_impulse(
    a: &Side,
    b: &Side,
    v_rel: &Vec3,
    normal: &Vec3,
    response: &Response,
) -> Option<Vec3> {
    let approach = v_rel.dot(normal);
    if approach <= 0.0 {
        return None;
    }
    let target = target_velocity(v_rel, normal, response);
    let k_inv = effective_mass(a, b).inverse()?;
    let j = k_inv * (target - *v_rel);
    j.is_finite().then_some(j)
}

/// World-space point at which a pair contact is resolved.
pub fn contact_point(a: &Body, b: &Body, contact: &Contact, model: ContactPointModel) -> Vec3 {
    match (model, contact.source) {
        (ContactPointModel::EpaWitness, ContactSource::Epa) => {
            (contact.point_a + contact.point_b).scale(0.5)
        }
        _ => (a.position() + b.position()).scale(0.5),
    }
}

/// Outcome of [`resolve_pair`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PairResolution {
    /// Impulse applied to the first body, if any.
    pub impulse: Option<Vec3>,
    /// Total positional correction applied along the normal.
    pub correction: f32,
}

fn solve_pair(a: &Body, b: &Body, contact: &Contact, config: &SimConfig) -> (Option<Vec3>, Side, Side) {
    let point = contact_point(a, b, contact, config.contact_point);
    let side_a = Side::of(a, &point);
    let side_b = Side::of(b, &point);
    let v_rel = a.velocity_at(&point) - b.velocity_at(&point);
    let impulse = solve_impulse(&side_a, &side_b, &v_rel, &contact.normal, &Response::from_config(config));
    (impulse, side_a, side_b)
}

/// Impulse [`resolve_pair`] would apply to `a` (`b` receives its negation).
/// Neither body is modified.
pub fn pair_impulse(a: &Body, b: &Body, contact: &Contact, config: &SimConfig) -> Option<Vec3> {
    solve_pair(a, b, contact, config).0
}

/// Resolves a contact between two movable bodies.
///
/// `contact.normal` must point from `a` towards `b`.
pub fn resolve_pair(a: &mut Body, b: &mut Body, contact: &Contact, config: &SimConfig) -> PairResolution {
    let (impulse, side_a, side_b) = solve_pair(a, b, contact, config);
    if let Some(j) = impulse {
        a.apply_impulse(&j, &side_a.lever);
        b.apply_impulse(&-j, &side_b.lever);
        trace!(jx = j.x(), jy = j.y(), jz = j.z(), "pair impulse");
    }

    let mut correction = 0.0;
    let total = a.inverse_mass() + b.inverse_mass();
    if config.positional_correction && contact.depth > 0.0 && total > 0.0 {
        let push = contact.normal.scale(contact.depth / total);
        a.set_position(a.position() - push.scale(a.inverse_mass()));
        b.set_position(b.position() + push.scale(b.inverse_mass()));
        correction = contact.depth;
    }
    PairResolution { impulse, correction }
}
