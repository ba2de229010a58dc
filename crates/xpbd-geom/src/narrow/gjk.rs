// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Gilbert–Johnson–Keerthi intersection test on support mappings.
//!
//! The simplex is kept oldest-first; the newest point is always last and is
//! called `a` in the case analysis below. Each case either shrinks the
//! simplex to the feature closest to the origin and picks a new search
//! direction, or (for a tetrahedron enclosing the origin) reports overlap.

use tracing::trace;
use xpbd_core::math::{Vec3, EPSILON};

use super::support::{minkowski_support, SupportMap, SupportPoint};

/// Iteration cap used when the caller has no preference.
pub const DEFAULT_MAX_ITERATIONS: u32 = 64;

/// Final simplex of a successful GJK query, oldest point first.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex {
    points: Vec<SupportPoint>,
}

impl Simplex {
    pub(crate) fn from_points(points: Vec<SupportPoint>) -> Self {
        Self { points }
    }

    /// Simplex vertices, oldest first.
    pub fn points(&self) -> &[SupportPoint] {
        &self.points
    }

    /// Number of vertices (1 to 4).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a simplex returned by [`intersect`].
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `true` when the simplex can seed EPA.
    pub fn is_tetrahedron(&self) -> bool {
        self.points.len() == 4
    }
}

/// Returns the enclosing simplex when `A` and `B` overlap, `None` otherwise.
///
/// Surfaces that merely touch are reported as separated: the terminating
/// support projection is zero, which is not past the origin. Exhausting
/// `max_iterations` also yields `None`.
pub fn intersect<A, B>(a: &A, b: &B, max_iterations: u32) -> Option<Simplex>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut direction = a.center() - b.center();
    if direction.length_squared() <= EPSILON * EPSILON {
        direction = Vec3::UNIT_X;
    }
    let first = minkowski_support(a, b, &direction);
    let mut points = Vec::with_capacity(4);
    points.push(first);
    if first.point.length_squared() < EPSILON * EPSILON {
        return Some(Simplex { points });
    }
    direction = -first.point;

    for iteration in 0..max_iterations {
        let next = minkowski_support(a, b, &direction);
        let progress = next.point.dot(&direction);
        trace!(iteration, progress, simplex = points.len(), "gjk step");
        if progress <= 0.0 {
            return None;
        }
        points.push(next);
        if do_simplex(&mut points, &mut direction) {
            return Some(Simplex { points });
        }
    }
    trace!(max_iterations, "gjk iteration cap reached");
    None
}

fn do_simplex(points: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
    match points.len() {
        2 => {
            line_case(points, direction);
            false
        }
        3 => {
            triangle_case(points, direction);
            false
        }
        4 => tetrahedron_case(points, direction),
        _ => false,
    }
}

/// Segment `[b, a]`: project the origin, keep the closest feature.
fn line_case(points: &mut Vec<SupportPoint>, direction: &mut Vec3) {
    let (b, a) = (points[0], points[1]);
    let ab = b.point - a.point;
    let ao = -a.point;
    let denom = ab.length_squared();
    if denom <= EPSILON * EPSILON {
        *points = vec![a];
        *direction = ao;
        return;
    }
    let t = ao.dot(&ab) / denom;
    if t <= 0.0 {
        *points = vec![a];
        *direction = ao;
    } else if t >= 1.0 {
        *points = vec![b];
        *direction = -b.point;
    } else {
        let closest = a.point + ab.scale(t);
        // Origin on the segment: any perpendicular keeps the search going.
        *direction = if closest.length_squared() <= EPSILON * EPSILON {
            ab.any_orthogonal()
        } else {
            -closest
        };
    }
}

/// Triangle `[c, b, a]`: drop to an edge if the origin lies outside one,
/// otherwise search above or below the face.
fn triangle_case(points: &mut Vec<SupportPoint>, direction: &mut Vec3) {
    let (c, b, a) = (points[0], points[1], points[2]);
    let ab = b.point - a.point;
    let ac = c.point - a.point;
    let ao = -a.point;
    let abc = ab.cross(&ac);

    if abc.cross(&ac).dot(&ao) > 0.0 {
        *points = vec![c, a];
        line_case(points, direction);
    } else if ab.cross(&abc).dot(&ao) > 0.0 || abc.length_squared() <= EPSILON * EPSILON {
        *points = vec![b, a];
        line_case(points, direction);
    } else if abc.dot(&ao) >= 0.0 {
        *direction = abc;
    } else {
        // Swap winding so the stored normal faces the origin.
        *points = vec![b, c, a];
        *direction = -abc;
    }
}

/// Tetrahedron `[d, c, b, a]`: if the origin is outside a face through `a`,
/// drop the opposite vertex and continue with that face.
fn tetrahedron_case(points: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
    let (d, c, b, a) = (points[0], points[1], points[2], points[3]);
    let ao = -a.point;
    // Origin within this distance of a face plane counts as inside; without
    // it, rounding can flip the simplex between two faces indefinitely.
    let slack = EPSILON * a.point.length().max(1.0);
    for (p, q, opposite) in [(b, c, d), (c, d, b), (d, b, c)] {
        let mut normal = (p.point - a.point).cross(&(q.point - a.point));
        if normal.dot(&(opposite.point - a.point)) > 0.0 {
            normal = -normal;
        }
        if normal.dot(&ao) > slack * normal.length() {
            *points = vec![q, p, a];
            triangle_case(points, direction);
            return false;
        }
    }
    true
}
