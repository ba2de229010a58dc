// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only mesh geometry supplied by the mesh collaborator.
//!
//! The kernel never generates or uploads meshes. It reads local-space vertex
//! positions for AABB extent, inertia accumulation, support mapping when a
//! body has no explicit [`crate::shape::Shape`], and half-space vertex tests.

use crate::math::Vec3;

/// Local-space vertex positions plus optional triangle index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates a mesh from positions and triangles.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Creates a point-cloud mesh with no triangles.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self::new(positions, Vec::new())
    }

    /// Local-space vertex positions, in submission order.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples (may be empty).
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// `true` when the mesh carries no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local-space vertex furthest along `direction`, or `None` for an empty
    /// mesh. Ties keep the earliest vertex.
    pub fn support(&self, direction: &Vec3) -> Option<Vec3> {
        let mut iter = self.positions.iter();
        let first = *iter.next()?;
        let mut best = first;
        let mut best_dot = first.dot(direction);
        for v in iter {
            let d = v.dot(direction);
            if d > best_dot {
                best_dot = d;
                best = *v;
            }
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_picks_extreme_vertex() {
        let mesh = Mesh::from_positions(vec![
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        ]);
        assert_eq!(mesh.support(&Vec3::UNIT_X), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(mesh.support(&Vec3::UNIT_Y), Some(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(Mesh::default().support(&Vec3::UNIT_X), None);
    }
}
