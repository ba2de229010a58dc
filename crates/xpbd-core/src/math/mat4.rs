// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Mat3, Vec3};

/// Column-major 4×4 affine transform, the layout a renderer uploads as-is.
///
/// ```
/// use xpbd_core::math::{Mat4, Vec3};
/// let m = Mat4::translation(0.0, -0.1, 0.0);
/// assert_eq!(m.transform_point(&Vec3::new(1.0, 0.1, 2.0)).to_array(), [1.0, 0.0, 2.0]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    data: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    /// Matrix from sixteen column-major entries.
    pub const fn new(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// No transform.
    pub const fn identity() -> Self {
        Self::translation(0.0, 0.0, 0.0)
    }

    /// Pure translation; the offset sits in the fourth column.
    #[rustfmt::skip]
    pub const fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        Self::new([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            tx, ty, tz, 1.0,
        ])
    }

    /// Rigid transform `T · R` from a rotation block and a translation.
    #[rustfmt::skip]
    pub fn from_rotation_translation(rotation: &Mat3, translation: &Vec3) -> Self {
        let r = |row: usize, col: usize| rotation.at(row, col);
        let [tx, ty, tz] = translation.to_array();
        Self::new([
            r(0, 0), r(1, 0), r(2, 0), 0.0,
            r(0, 1), r(1, 1), r(2, 1), 0.0,
            r(0, 2), r(1, 2), r(2, 2), 0.0,
            tx, ty, tz, 1.0,
        ])
    }

    /// The sixteen entries, column-major.
    pub fn to_array(self) -> [f32; 16] {
        self.data
    }

    fn at(&self, row: usize, col: usize) -> f32 {
        self.data[col * 4 + row]
    }

    fn column(&self, col: usize) -> Vec3 {
        Vec3::new(self.at(0, col), self.at(1, col), self.at(2, col))
    }

    /// Matrix product `self · rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut data = [0.0; 16];
        for (idx, out) in data.iter_mut().enumerate() {
            let (col, row) = (idx / 4, idx % 4);
            *out = (0..4).map(|k| self.at(row, k) * rhs.at(k, col)).sum();
        }
        Self { data }
    }

    /// Applies the linear block only (`w = 0`).
    pub fn transform_direction(&self, direction: &Vec3) -> Vec3 {
        let [x, y, z] = direction.to_array();
        self.column(0).scale(x) + self.column(1).scale(y) + self.column(2).scale(z)
    }

    /// Applies the full affine transform (`w = 1`, no perspective divide).
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.transform_direction(point) + self.column(3)
    }
}

impl From<[f32; 16]> for Mat4 {
    fn from(data: [f32; 16]) -> Self {
        Self { data }
    }
}

impl core::ops::Mul for Mat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}
