// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Convex collision shapes exposing a support mapping.
//!
//! Every variant answers the same query: the furthest local-space point along
//! a direction. GJK and EPA are written against that query only.

use crate::error::ShapeError;
use crate::math::Vec3;

/// Convex geometry in body-local coordinates. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Ball of `radius` centred at `center`.
    Sphere {
        /// Radius in metres; non-negative.
        radius: f32,
        /// Local-space centre offset from the body origin.
        center: Vec3,
    },
    /// Convex polyhedron given by its vertices; `faces` index into
    /// `vertices` and are informational (support only needs the vertices).
    ConvexHull {
        /// Hull vertices; non-empty.
        vertices: Vec<Vec3>,
        /// Polygonal faces as vertex index loops.
        faces: Vec<Vec<u32>>,
    },
}

impl Shape {
    /// Sphere centred at the body origin.
    pub fn sphere(radius: f32) -> Result<Self, ShapeError> {
        Self::sphere_at(radius, Vec3::ZERO)
    }

    /// Sphere centred at a local offset.
    pub fn sphere_at(radius: f32, center: Vec3) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        if !center.is_finite() {
            return Err(ShapeError::NonFiniteVertex(0));
        }
        Ok(Self::Sphere { radius, center })
    }

    /// Convex hull from vertices and faces. Faces may be empty.
    pub fn convex_hull(vertices: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Result<Self, ShapeError> {
        if vertices.is_empty() {
            return Err(ShapeError::EmptyHull);
        }
        if let Some(idx) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(ShapeError::NonFiniteVertex(idx));
        }
        for (face, loop_) in faces.iter().enumerate() {
            if let Some(&index) = loop_.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(ShapeError::FaceIndexOutOfRange {
                    face,
                    index,
                    len: vertices.len(),
                });
            }
        }
        Ok(Self::ConvexHull { vertices, faces })
    }

    /// Axis-aligned box hull with the given half extents, centred at the
    /// origin. Faces are the six quads.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Result<Self, ShapeError> {
        let vertices = vec![
            Vec3::new(-hx, -hy, -hz),
            Vec3::new(hx, -hy, -hz),
            Vec3::new(hx, hy, -hz),
            Vec3::new(-hx, hy, -hz),
            Vec3::new(-hx, -hy, hz),
            Vec3::new(hx, -hy, hz),
            Vec3::new(hx, hy, hz),
            Vec3::new(-hx, hy, hz),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![3, 7, 6, 2],
            vec![0, 4, 7, 3],
            vec![1, 2, 6, 5],
        ];
        Self::convex_hull(vertices, faces)
    }

    /// Furthest local-space point along `direction`.
    ///
    /// A zero direction is replaced by `+X` for spheres; hulls return their
    /// first vertex. A hull built by hand with no vertices answers the origin.
    pub fn support(&self, direction: &Vec3) -> Vec3 {
        match self {
            Self::Sphere { radius, center } => {
                *center + direction.normalize_or(Vec3::UNIT_X).scale(*radius)
            }
            Self::ConvexHull { vertices, .. } => {
                let mut iter = vertices.iter();
                let Some(&first) = iter.next() else {
                    return Vec3::ZERO;
                };
                let mut best = first;
                let mut best_dot = best.dot(direction);
                for v in iter {
                    let d = v.dot(direction);
                    if d > best_dot {
                        best_dot = d;
                        best = *v;
                    }
                }
                best
            }
        }
    }

    /// Local-space points that bound the shape for AABB purposes: the hull
    /// vertices, or `None` for a sphere (bounded analytically).
    pub fn hull_vertices(&self) -> Option<&[Vec3]> {
        match self {
            Self::Sphere { .. } => None,
            Self::ConvexHull { vertices, .. } => Some(vertices),
        }
    }
}
