// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Expanding Polytope Algorithm: penetration depth and normal from a GJK
//! tetrahedron.

use std::collections::BTreeMap;

use tracing::trace;
use xpbd_core::math::{Vec3, EPSILON};

use super::gjk::Simplex;
use super::support::{minkowski_support, SupportMap, SupportPoint};
use crate::error::EpaError;

/// Iteration cap used when the caller has no preference. Curved shapes
/// need far more iterations than boxes to reach [`DEFAULT_TOLERANCE`].
pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
/// Convergence threshold on `support projection − face distance`.
///
/// On curved surfaces this bounds the normal's angular error: a face
/// within `t` of a sphere of radius `r` spans about `√(2t/r)` radians.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Penetration of `A` into `B`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Penetration {
    /// Distance `A` must move along `-normal` (or `B` along `normal`) to
    /// separate the shapes.
    pub depth: f32,
    /// Unit normal of the closest face of `A − B`.
    pub normal: Vec3,
    /// Deepest point on `A` (world space).
    pub witness_a: Vec3,
    /// Deepest point on `B` (world space).
    pub witness_b: Vec3,
    /// Iterations used before converging.
    pub iterations: u32,
}

#[derive(Debug, Copy, Clone)]
struct Face {
    indices: [usize; 3],
    normal: Vec3,
    distance: f32,
}

/// Builds a face oriented away from `interior`; `None` for zero-area input.
fn make_face(vertices: &[SupportPoint], i: usize, j: usize, k: usize, interior: &Vec3) -> Option<Face> {
    let a = vertices[i].point;
    let cross = (vertices[j].point - a).cross(&(vertices[k].point - a));
    let len = cross.length();
    if len <= EPSILON {
        return None;
    }
    let mut normal = cross.scale(1.0 / len);
    let mut indices = [i, j, k];
    if normal.dot(&(a - *interior)) < 0.0 {
        normal = -normal;
        indices = [i, k, j];
    }
    Some(Face {
        indices,
        normal,
        distance: normal.dot(&a),
    })
}

/// Expands the GJK simplex until the closest face of `A − B` to the origin
/// is found within `tolerance`.
pub fn penetration<A, B>(
    a: &A,
    b: &B,
    simplex: &Simplex,
    max_iterations: u32,
    tolerance: f32,
) -> Result<Penetration, EpaError>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    if !simplex.is_tetrahedron() {
        return Err(EpaError::NonTetrahedralSimplex(simplex.len()));
    }
    let mut vertices: Vec<SupportPoint> = simplex.points().to_vec();
    // The seed centroid stays strictly inside the polytope as it grows, so
    // it orients every face the same way.
    let interior = vertices
        .iter()
        .fold(Vec3::ZERO, |acc, v| acc + v.point)
        .scale(0.25);
    let mut faces: Vec<Face> = [(0, 1, 2), (0, 3, 1), (0, 2, 3), (1, 3, 2)]
        .into_iter()
        .filter_map(|(i, j, k)| make_face(&vertices, i, j, k, &interior))
        .collect();

    for iteration in 0..max_iterations {
        let Some(closest) = faces
            .iter()
            .copied()
            .reduce(|best, f| if f.distance < best.distance { f } else { best })
        else {
            return Err(EpaError::DegeneratePolytope);
        };

        let next = minkowski_support(a, b, &closest.normal);
        let projection = next.point.dot(&closest.normal);
        trace!(
            iteration,
            faces = faces.len(),
            distance = closest.distance,
            projection,
            "epa step"
        );
        if projection - closest.distance < tolerance {
            let (witness_a, witness_b) = witnesses(&vertices, &closest);
            return Ok(Penetration {
                depth: closest.distance,
                normal: closest.normal,
                witness_a,
                witness_b,
                iterations: iteration,
            });
        }

        let new_index = vertices.len();
        vertices.push(next);

        // Edges shared by two visible faces are interior to the hole; only
        // edges seen once form the silhouette.
        let mut edges: BTreeMap<(usize, usize), u32> = BTreeMap::new();
        faces.retain(|face| {
            let visible = face.normal.dot(&next.point) - face.distance > EPSILON;
            if visible {
                let [i, j, k] = face.indices;
                for (u, v) in [(i, j), (j, k), (k, i)] {
                    *edges.entry((u.min(v), u.max(v))).or_insert(0) += 1;
                }
            }
            !visible
        });
        for ((u, v), count) in edges {
            if count == 1 {
                if let Some(face) = make_face(&vertices, u, v, new_index, &interior) {
                    faces.push(face);
                }
            }
        }
        if faces.is_empty() {
            return Err(EpaError::DegeneratePolytope);
        }
    }
    Err(EpaError::NoConvergence {
        iterations: max_iterations,
    })
}

/// Interpolates the source points of the closest face at the origin's
/// projection onto it.
fn witnesses(vertices: &[SupportPoint], face: &Face) -> (Vec3, Vec3) {
    let [i, j, k] = face.indices;
    let (a, b, c) = (vertices[i], vertices[j], vertices[k]);
    let p = face.normal.scale(face.distance);
    let v0 = b.point - a.point;
    let v1 = c.point - a.point;
    let v2 = p - a.point;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    let (u, v, w) = if denom.abs() <= EPSILON * EPSILON {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    } else {
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        (1.0 - v - w, v, w)
    };
    let on_a = a.on_a.scale(u) + b.on_a.scale(v) + c.on_a.scale(w);
    let on_b = a.on_b.scale(u) + b.on_b.scale(v) + c.on_b.scale(w);
    (on_a, on_b)
}
