// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact between a movable body and an immovable half-space.
//!
//! The moving body is sampled at world-space points (its mesh vertices,
//! hull vertices, or deepest sphere point). Points below the plane that are
//! also moving into it share one averaged lever arm, and a single impulse is
//! solved against a side with zero inverse mass.

use xpbd_core::body::Body;
use xpbd_core::math::Vec3;
use xpbd_core::shape::Shape;
use xpbd_geom::narrow::support::{BodySupport, SupportMap};

use crate::config::GroundPlane;
use crate::contact::{solve_impulse, Response, Side};

/// Plane `normal · x = offset`; the free side is the one `normal` points to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HalfSpace {
    normal: Vec3,
    offset: f32,
}

impl HalfSpace {
    /// Creates a half-space; `normal` is normalised with `+Y` as fallback.
    pub fn new(normal: Vec3, offset: f32) -> Self {
        Self {
            normal: normal.normalize_or(Vec3::UNIT_Y),
            offset,
        }
    }

    /// The configured world ground plane.
    pub fn from_ground(ground: &GroundPlane) -> Self {
        Self::new(ground.normal_vec(), ground.height)
    }

    /// Supporting plane of `body` facing `normal`: it touches the body's
    /// furthest point along `normal`.
    pub fn supporting(body: &Body, normal: &Vec3) -> Self {
        let n = normal.normalize_or(Vec3::UNIT_Y);
        let extreme = BodySupport::new(body).support(&n);
        Self::new(n, n.dot(&extreme))
    }

    /// Unit outward normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Offset along the normal.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Positive above the plane, negative below.
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// World-space points of `body` tested against a plane with `normal`.
///
/// Mesh vertices take priority, then hull vertices, then the deepest point
/// of a sphere, then the body origin.
pub fn sample_points(body: &Body, normal: &Vec3) -> Vec<Vec3> {
    if let Some(mesh) = body.mesh().filter(|m| !m.is_empty()) {
        return mesh.positions().iter().map(|p| body.local_to_world(p)).collect();
    }
    let Some(shape) = body.shape() else {
        return vec![body.position()];
    };
    match shape.as_ref() {
        Shape::ConvexHull { vertices, .. } => {
            vertices.iter().map(|p| body.local_to_world(p)).collect()
        }
        Shape::Sphere { .. } => vec![BodySupport::new(body).support(&-*normal)],
    }
}

/// Outcome of a half-space contact.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HalfSpaceContact {
    /// Deepest sample penetration (positive).
    pub depth: f32,
    /// Sample points that were below the plane and moving into it.
    pub approaching: usize,
    /// Impulse applied at the averaged lever arm, if any.
    pub impulse: Option<Vec3>,
}

/// Resolves `body` against `plane`. Returns `None` when no sample point is
/// below the plane.
///
/// The other side is treated as stationary and infinitely heavy. With
/// `positional_correction` the body is lifted out by the full depth.
pub fn resolve(
    body: &mut Body,
    plane: &HalfSpace,
    response: &Response,
    positional_correction: bool,
) -> Option<HalfSpaceContact> {
    let n = plane.normal();
    let points = sample_points(body, &n);
    let depth = points
        .iter()
        .map(|p| -plane.signed_distance(p))
        .fold(f32::NEG_INFINITY, f32::max);
    if depth <= 0.0 {
        return None;
    }

    let origin = body.position();
    let (sum, approaching) = points
        .iter()
        .filter(|p| plane.signed_distance(p) < 0.0 && body.velocity_at(p).dot(&n) < 0.0)
        .fold((Vec3::ZERO, 0usize), |(sum, count), p| (sum + (*p - origin), count + 1));

    let mut impulse = None;
    if approaching > 0 {
        let lever = sum.scale(1.0 / approaching as f32);
        let point = origin + lever;
        let side = Side::of(body, &point);
        // The moving body is "body 1", so the normal runs into the plane.
        let v_rel = body.velocity_at(&point);
        impulse = solve_impulse(&side, &Side::immovable(), &v_rel, &-n, response);
        if let Some(j) = impulse {
            body.apply_impulse(&j, &lever);
        }
    }

    if positional_correction {
        body.set_position(body.position() + n.scale(depth));
    }
    Some(HalfSpaceContact {
        depth,
        approaching,
        impulse,
    })
}
