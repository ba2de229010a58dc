// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Mat3, Vec3, EPSILON};

/// Rotation quaternion, stored `(x, y, z, w)` with `w` the scalar part.
///
/// Angles are radians. Body orientations are kept unit length: the
/// integrator applies a first-order additive update and then re-normalises.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    data: [f32; 4],
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    /// Quaternion from raw components; no normalisation is applied.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// No rotation.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Pure quaternion `(v, 0)`, used to lift an angular increment into
    /// quaternion space.
    pub fn from_pure(v: Vec3) -> Self {
        let [x, y, z] = v.to_array();
        Self::new(x, y, z, 0.0)
    }

    /// Rotation of `angle` radians about `axis`; identity for a degenerate
    /// axis.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize();
        if axis == Vec3::ZERO {
            return Self::identity();
        }
        let (sin, cos) = (angle * 0.5).sin_cos();
        let [x, y, z] = axis.scale(sin).to_array();
        Self::new(x, y, z, cos)
    }

    /// `[x, y, z, w]`.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    /// Vector part `(x, y, z)`.
    pub fn vector(&self) -> Vec3 {
        let [x, y, z, _] = self.data;
        Vec3::new(x, y, z)
    }

    /// Scalar part `w`.
    pub fn scalar(&self) -> f32 {
        self.data[3]
    }

    /// Hamilton product `self ⊗ other`: applies `other` first, then `self`.
    ///
    /// ```
    /// use core::f32::consts::FRAC_PI_2;
    /// use xpbd_core::math::{Quat, Vec3};
    /// let yaw = Quat::from_axis_angle(Vec3::UNIT_Y, FRAC_PI_2);
    /// let roll = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
    /// assert_ne!(yaw.multiply(&roll), roll.multiply(&yaw));
    /// ```
    pub fn multiply(&self, other: &Self) -> Self {
        let (u, a) = (self.vector(), self.scalar());
        let (v, b) = (other.vector(), other.scalar());
        let xyz = v.scale(a) + u.scale(b) + u.cross(&v);
        let [x, y, z] = xyz.to_array();
        Self::new(x, y, z, a * b - u.dot(&v))
    }

    /// Component-wise sum. Not a rotation composition; the integrator uses it
    /// for the first-order update `q + dq` before re-normalising.
    pub fn add(&self, other: &Self) -> Self {
        let mut data = self.data;
        for (lhs, rhs) in data.iter_mut().zip(other.data) {
            *lhs += rhs;
        }
        Self { data }
    }

    /// Four-component Euclidean norm.
    pub fn length(&self) -> f32 {
        self.data.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    /// Unit quaternion in the same direction; identity when the norm is at
    /// most `EPSILON`.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = len.recip();
        Self {
            data: self.data.map(|c| c * inv),
        }
    }

    /// Conjugate `(-x, -y, -z, w)`; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(-x, -y, -z, w)
    }

    /// Rotates `v` by this quaternion (assumed unit length).
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        // v' = v + 2w(u × v) + 2u × (u × v)
        let u = self.vector();
        let uv = u.cross(v);
        let uuv = u.cross(&uv);
        *v + uv.scale(2.0 * self.scalar()) + uuv.scale(2.0)
    }

    /// Equivalent 3×3 rotation matrix (normalises first).
    pub fn to_mat3(&self) -> Mat3 {
        let [x, y, z, w] = self.normalize().data;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Mat3::from_rows([
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
        ])
    }
}

/// `[x, y, z, w]` taken verbatim, without normalisation.
impl From<[f32; 4]> for Quat {
    fn from(data: [f32; 4]) -> Self {
        Self { data }
    }
}
