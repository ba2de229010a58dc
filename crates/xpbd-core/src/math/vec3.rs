// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::math::EPSILON;

/// Three-component `f32` vector: positions, directions, velocities, and
/// angular quantities all share it.
///
/// Points go through [`crate::math::Mat4::transform_point`]; directions go
/// through [`crate::math::Mat4::transform_direction`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vec3 {
    data: [f32; 3],
}

impl Vec3 {
    /// `(0, 0, 0)`.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// `+X`.
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);
    /// `+Y`, the default up axis.
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);
    /// `+Z`.
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Vector `(x, y, z)`.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { data: [x, y, z] }
    }

    /// Vector with all three components set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// `[x, y, z]`.
    pub fn to_array(self) -> [f32; 3] {
        self.data
    }

    /// X component.
    pub fn x(&self) -> f32 {
        self.data[0]
    }

    /// Y component.
    pub fn y(&self) -> f32 {
        self.data[1]
    }

    /// Z component.
    pub fn z(&self) -> f32 {
        self.data[2]
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(f(ax, bx), f(ay, by), f(az, bz))
    }

    /// `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    /// `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }

    /// Every component multiplied by `s`.
    pub fn scale(&self, s: f32) -> Self {
        let [x, y, z] = self.data;
        Self::new(x * s, y * s, z * s)
    }

    /// Inner product.
    pub fn dot(&self, other: &Self) -> f32 {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        ax * bx + ay * by + az * bz
    }

    /// Right-handed cross product `self × other`.
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    /// Euclidean length.
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// `|self|²`, avoiding the square root.
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Unit vector in the same direction, or [`Vec3::ZERO`] when the length
    /// is at most `EPSILON` so callers can detect the degenerate case.
    pub fn normalize(&self) -> Self {
        self.normalize_or(Self::ZERO)
    }

    /// Unit vector in the same direction, or `fallback` when the length is at
    /// most `EPSILON`.
    pub fn normalize_or(&self, fallback: Self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            fallback
        } else {
            self.scale(len.recip())
        }
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        self.zip_with(other, f32::min)
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        self.zip_with(other, f32::max)
    }

    /// Returns a unit vector perpendicular to `self`.
    ///
    /// Crosses with the world axis least aligned with `self`; a degenerate
    /// input yields `UNIT_Y`.
    pub fn any_orthogonal(&self) -> Self {
        let [x, y, z] = self.data.map(f32::abs);
        let axis = if x <= y && x <= z {
            Self::UNIT_X
        } else if y <= z {
            Self::UNIT_Y
        } else {
            Self::UNIT_Z
        };
        self.cross(&axis).normalize_or(Self::UNIT_Y)
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }
}

/// `[x, y, z]` into a vector.
///
/// ```
/// use xpbd_core::math::Vec3;
/// assert_eq!(Vec3::from([0.0, -9.81, 0.0]).y(), -9.81);
/// ```
impl From<[f32; 3]> for Vec3 {
    fn from(data: [f32; 3]) -> Self {
        Self { data }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(value: Vec3) -> Self {
        value.data
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vec3::add(&self, &rhs)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vec3::sub(&self, &rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Mul<Vec3> for f32 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs.scale(self)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = Vec3::add(self, &rhs);
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Vec3::sub(self, &rhs);
    }
}
