// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use xpbd_core::math::Vec3;

/// World-space bounding box used by the broad phase.
///
/// `min <= max` holds on every axis; [`Aabb::new`] sorts its corners so the
/// invariant cannot be broken from outside.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Box spanning two opposite corners given in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(&b),
            max: a.max(&b),
        }
    }

    /// Cube of half-extent `r` around `center`.
    pub fn cube(center: Vec3, r: f32) -> Self {
        let half = Vec3::splat(r);
        Self::new(center - half, center + half)
    }

    /// Lower corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Upper corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max).scale(0.5)
    }

    /// Half of the box size on each axis.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min).scale(0.5)
    }

    /// Closed-interval overlap on all three axes; touching faces overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (lo, hi) = (self.min.max(&other.min), self.max.min(&other.max));
        lo.to_array().into_iter().zip(hi.to_array()).all(|(l, h)| l <= h)
    }

    /// `true` when `other` lies entirely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        self.min.min(&other.min) == self.min && self.max.max(&other.max) == self.max
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    fn grow(self, p: &Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Tightest box around `points`; `None` when there are none.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        Self::from_mapped_points(points, |p| *p)
    }

    /// [`Aabb::from_points`] over `f(p)` for each point, without collecting
    /// the mapped points first.
    pub fn from_mapped_points<F>(points: &[Vec3], f: F) -> Option<Self>
    where
        F: Fn(&Vec3) -> Vec3,
    {
        let (first, rest) = points.split_first()?;
        let seed = f(first);
        Some(rest.iter().fold(Self::new(seed, seed), |acc, p| acc.grow(&f(p))))
    }
}
