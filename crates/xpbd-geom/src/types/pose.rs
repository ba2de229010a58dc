// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use xpbd_core::body::Body;
use xpbd_core::math::{Mat4, Quat, Vec3};

/// Rigid pose (translation + rotation) used to place shapes and meshes.
///
/// Conventions:
/// - `translation` in meters (world space).
/// - `rotation` as a unit quaternion.
/// - Local points map to world as `x + R·p`; bodies carry no scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    translation: Vec3,
    rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Identity pose (no translation, no rotation).
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::identity(),
        }
    }

    /// Creates a pose from components; `rotation` is normalised.
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Current pose of `body`.
    pub fn of(body: &Body) -> Self {
        Self {
            translation: body.position(),
            rotation: body.orientation(),
        }
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Maps a local point into world space.
    pub fn transform_point(&self, local: &Vec3) -> Vec3 {
        self.translation + self.rotation.rotate(local)
    }

    /// Rotates a local direction into world space.
    pub fn rotate(&self, local: &Vec3) -> Vec3 {
        self.rotation.rotate(local)
    }

    /// Rotates a world direction into the local frame.
    pub fn inverse_rotate(&self, world: &Vec3) -> Vec3 {
        self.rotation.conjugate().rotate(world)
    }

    /// Returns the column-major `Mat4` corresponding to this pose (`T · R`).
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(&self.rotation.to_mat3(), &self.translation)
    }
}
