// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{Add, Mul, Sub};

use crate::math::{Vec3, EPSILON};

/// Row-major 3×3 matrix used for inertia tensors, rotation blocks, and the
/// contact effective-mass system.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    rows: [[f32; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    /// The zero matrix.
    pub const ZERO: Self = Self::from_rows([[0.0; 3]; 3]);

    /// Builds a matrix from rows.
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Returns the identity matrix.
    pub const fn identity() -> Self {
        Self::from_diagonal(1.0, 1.0, 1.0)
    }

    /// Diagonal matrix `diag(a, b, c)`.
    pub const fn from_diagonal(a: f32, b: f32, c: f32) -> Self {
        Self::from_rows([[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    /// Skew-symmetric cross-product matrix `[a]×` such that
    /// `skew(a) * b == a × b`.
    pub fn skew(a: &Vec3) -> Self {
        let [x, y, z] = a.to_array();
        Self::from_rows([[0.0, -z, y], [z, 0.0, -x], [-y, x, 0.0]])
    }

    /// Outer product `a bᵀ`.
    pub fn outer(a: &Vec3, b: &Vec3) -> Self {
        let a = a.to_array();
        let b = b.to_array();
        let mut rows = [[0.0; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = a[r] * b[c];
            }
        }
        Self::from_rows(rows)
    }

    /// Returns the rows.
    pub fn to_rows(self) -> [[f32; 3]; 3] {
        self.rows
    }

    /// Element at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.rows[row][col]
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        let m = &self.rows;
        Self::from_rows([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// Matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[r][0] * rhs.rows[0][c]
                    + self.rows[r][1] * rhs.rows[1][c]
                    + self.rows[r][2] * rhs.rows[2][c];
            }
        }
        Self::from_rows(out)
    }

    /// Matrix–vector product `self * v`.
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x() + r[0][1] * v.y() + r[0][2] * v.z(),
            r[1][0] * v.x() + r[1][1] * v.y() + r[1][2] * v.z(),
            r[2][0] * v.x() + r[2][1] * v.y() + r[2][2] * v.z(),
        )
    }

    /// Multiplies every element by `s`.
    pub fn scale(&self, s: f32) -> Self {
        let mut out = self.rows;
        for row in &mut out {
            for cell in row.iter_mut() {
                *cell *= s;
            }
        }
        Self::from_rows(out)
    }

    fn zip(&self, rhs: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut out = self.rows;
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = f(*cell, rhs.rows[r][c]);
            }
        }
        Self::from_rows(out)
    }

    /// Determinant.
    pub fn determinant(&self) -> f32 {
        let m = &self.rows;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate, or `None` when `|det|` is at or below
    /// `EPSILON` scaled by the matrix magnitude.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        let magnitude = self
            .rows
            .iter()
            .flatten()
            .fold(0.0_f32, |acc, v| acc.max(v.abs()));
        if !det.is_finite() || det.abs() <= EPSILON * magnitude.powi(3).max(EPSILON) {
            return None;
        }
        let m = &self.rows;
        let inv_det = 1.0 / det;
        let cofactor = [
            [
                m[1][1] * m[2][2] - m[1][2] * m[2][1],
                m[0][2] * m[2][1] - m[0][1] * m[2][2],
                m[0][1] * m[1][2] - m[0][2] * m[1][1],
            ],
            [
                m[1][2] * m[2][0] - m[1][0] * m[2][2],
                m[0][0] * m[2][2] - m[0][2] * m[2][0],
                m[0][2] * m[1][0] - m[0][0] * m[1][2],
            ],
            [
                m[1][0] * m[2][1] - m[1][1] * m[2][0],
                m[0][1] * m[2][0] - m[0][0] * m[2][1],
                m[0][0] * m[1][1] - m[0][1] * m[1][0],
            ],
        ];
        Some(Self::from_rows(cofactor).scale(inv_det))
    }

    /// Returns `true` when every element is finite.
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }
}

impl Add for Mat3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.zip(&rhs, |a, b| a + b)
    }
}

impl Sub for Mat3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.zip(&rhs, |a, b| a - b)
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.mul_vec(&rhs)
    }
}

impl Mul<f32> for Mat3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}
