// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Support mappings: the only geometric query GJK and EPA make.

use xpbd_core::body::Body;
use xpbd_core::math::Vec3;
use xpbd_core::shape::Shape;

use crate::types::pose::Pose;

/// A convex set answering "furthest point along a direction" in world space.
pub trait SupportMap {
    /// World-space point of the set furthest along `direction`.
    fn support(&self, direction: &Vec3) -> Vec3;
    /// A point inside the set, used to seed the search direction.
    fn center(&self) -> Vec3;
}

/// Furthest world-space point of `shape` placed at `pose` along a world
/// direction.
pub fn support_world(shape: &Shape, pose: &Pose, direction: &Vec3) -> Vec3 {
    pose.transform_point(&shape.support(&pose.inverse_rotate(direction)))
}

/// A shape placed at a pose.
#[derive(Debug, Clone, Copy)]
pub struct PosedShape<'a> {
    shape: &'a Shape,
    pose: Pose,
}

impl<'a> PosedShape<'a> {
    /// Places `shape` at `pose`.
    pub fn new(shape: &'a Shape, pose: Pose) -> Self {
        Self { shape, pose }
    }
}

impl SupportMap for PosedShape<'_> {
    fn support(&self, direction: &Vec3) -> Vec3 {
        support_world(self.shape, &self.pose, direction)
    }

    fn center(&self) -> Vec3 {
        self.pose.translation()
    }
}

/// Support mapping of a body.
///
/// Uses the body's [`Shape`] when present, otherwise the point cloud of its
/// mesh vertices (their convex hull), otherwise the body position alone.
#[derive(Debug, Clone, Copy)]
pub struct BodySupport<'a> {
    body: &'a Body,
    pose: Pose,
}

impl<'a> BodySupport<'a> {
    /// Captures the body's current pose.
    pub fn new(body: &'a Body) -> Self {
        Self {
            body,
            pose: Pose::of(body),
        }
    }
}

impl SupportMap for BodySupport<'_> {
    fn support(&self, direction: &Vec3) -> Vec3 {
        let local_dir = self.pose.inverse_rotate(direction);
        let local = match (self.body.shape(), self.body.mesh()) {
            (Some(shape), _) => shape.support(&local_dir),
            (None, Some(mesh)) => mesh.support(&local_dir).unwrap_or(Vec3::ZERO),
            (None, None) => Vec3::ZERO,
        };
        self.pose.transform_point(&local)
    }

    fn center(&self) -> Vec3 {
        self.pose.translation()
    }
}

/// Vertex of the Minkowski difference `A − B`, remembering the two source
/// points so contact witnesses can be recovered.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SupportPoint {
    /// `on_a − on_b`.
    pub point: Vec3,
    /// Support point of `A` along the query direction.
    pub on_a: Vec3,
    /// Support point of `B` along the negated direction.
    pub on_b: Vec3,
}

/// Support of `A − B` along `direction`: `S(A, d) − S(B, −d)`.
pub fn minkowski_support<A, B>(a: &A, b: &B, direction: &Vec3) -> SupportPoint
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let on_a = a.support(direction);
    let on_b = b.support(&-*direction);
    SupportPoint {
        point: on_a - on_b,
        on_a,
        on_b,
    }
}
