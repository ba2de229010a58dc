// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World-space bounds of a body from its pose and geometry.

use xpbd_core::body::Body;
use xpbd_core::shape::Shape;

use crate::types::aabb::Aabb;
use crate::types::pose::Pose;

/// Half-extent of the box given to bodies with no geometry at all.
pub const DEFAULT_HALF_EXTENT: f32 = 0.05;

/// Computes the world AABB of `body`.
///
/// Source priority:
/// 1. sphere shape: world centre ± radius;
/// 2. convex hull shape: every vertex posed, then reduced;
/// 3. non-empty mesh: every vertex posed, then reduced;
/// 4. otherwise a cube of [`DEFAULT_HALF_EXTENT`] around the position.
pub fn world_aabb(body: &Body) -> Aabb {
    let pose = Pose::of(body);
    let from_shape = body.shape().and_then(|shape| match shape.as_ref() {
        Shape::Sphere { radius, center } => Some(Aabb::cube(pose.transform_point(center), *radius)),
        Shape::ConvexHull { vertices, .. } => {
            Aabb::from_mapped_points(vertices, |v| pose.transform_point(v))
        }
    });
    from_shape
        .or_else(|| {
            body.mesh()
                .and_then(|mesh| Aabb::from_mapped_points(mesh.positions(), |v| pose.transform_point(v)))
        })
        .unwrap_or_else(|| Aabb::cube(pose.translation(), DEFAULT_HALF_EXTENT))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xpbd_core::math::{Quat, Vec3};
    use xpbd_core::mesh::Mesh;

    #[test]
    fn sphere_shape_bounds_are_center_plus_minus_radius() {
        let body = Body::new(Vec3::new(1.0, 0.0, 0.0), 1.0)
            .with_shape(Arc::new(Shape::sphere(0.1).unwrap()));
        let b = world_aabb(&body);
        assert!((b.min() - Vec3::new(0.9, -0.1, -0.1)).length() < 1e-6);
        assert!((b.max() - Vec3::new(1.1, 0.1, 0.1)).length() < 1e-6);
    }

    #[test]
    fn rotated_mesh_vertices_are_posed() {
        let mesh = Mesh::from_positions(vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)]);
        let body = Body::new(Vec3::ZERO, 1.0)
            .with_mesh(Arc::new(mesh))
            .with_orientation(Quat::from_axis_angle(Vec3::UNIT_Z, core::f32::consts::FRAC_PI_2));
        let b = world_aabb(&body);
        assert!(b.max().y() > 0.999);
        assert!(b.max().x().abs() < 1e-5);
    }

    #[test]
    fn bare_body_gets_default_box() {
        let body = Body::new(Vec3::new(0.0, 2.0, 0.0), 1.0);
        let b = world_aabb(&body);
        assert!((b.half_extents() - Vec3::splat(DEFAULT_HALF_EXTENT)).length() < 1e-6);
    }
}
