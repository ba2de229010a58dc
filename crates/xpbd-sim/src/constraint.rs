// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! XPBD distance constraints between body origins.
//!
//! Each tick the Lagrange multiplier starts at zero and every relaxation
//! pass applies
//! `Δλ = (−C − α̃λ) / (w₁ + w₂ + α̃)` with `α̃ = compliance / dt²`,
//! moving each origin along the constraint gradient by `wᵢ·Δλ`.

use xpbd_core::body::{BodyId, BodyStore};
use xpbd_core::math::{Vec3, EPSILON};

use crate::error::SimError;

/// Floor on the current length so the gradient stays finite.
pub const MIN_LENGTH: f32 = 1e-4;

/// Keeps two body origins `rest_length` apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    a: BodyId,
    b: BodyId,
    rest_length: f32,
    compliance: f32,
    lambda: f32,
}

impl DistanceConstraint {
    /// Soft constraint with `compliance = 1 / stiffness`. An infinite
    /// stiffness gives a rigid constraint.
    pub fn new(a: BodyId, b: BodyId, rest_length: f32, stiffness: f32) -> Result<Self, SimError> {
        if stiffness.is_nan() || stiffness <= 0.0 {
            return Err(SimError::InvalidConstraint {
                field: "stiffness",
                value: stiffness,
            });
        }
        Self::with_compliance(a, b, rest_length, 1.0 / stiffness)
    }

    /// Rigid constraint (zero compliance).
    pub fn rigid(a: BodyId, b: BodyId, rest_length: f32) -> Result<Self, SimError> {
        Self::with_compliance(a, b, rest_length, 0.0)
    }

    /// Constraint with explicit compliance (m/N).
    pub fn with_compliance(
        a: BodyId,
        b: BodyId,
        rest_length: f32,
        compliance: f32,
    ) -> Result<Self, SimError> {
        if a == b {
            return Err(SimError::SelfConstraint(a));
        }
        if !rest_length.is_finite() || rest_length < 0.0 {
            return Err(SimError::InvalidConstraint {
                field: "rest_length",
                value: rest_length,
            });
        }
        if !compliance.is_finite() || compliance < 0.0 {
            return Err(SimError::InvalidConstraint {
                field: "compliance",
                value: compliance,
            });
        }
        Ok(Self {
            a,
            b,
            rest_length,
            compliance,
            lambda: 0.0,
        })
    }

    /// The constrained bodies.
    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.a, self.b)
    }

    /// Target distance.
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Inverse stiffness.
    pub fn compliance(&self) -> f32 {
        self.compliance
    }

    /// Multiplier accumulated this tick.
    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Current distance between the two origins.
    pub fn current_length(&self, store: &BodyStore) -> Option<f32> {
        let a = store.get(self.a)?;
        let b = store.get(self.b)?;
        Some((b.position() - a.position()).length())
    }

    /// Clears the multiplier at the start of a tick.
    pub fn reset(&mut self) {
        self.lambda = 0.0;
    }

    /// One relaxation pass. Returns `|Δλ|`; zero when both ends are
    /// immovable or a handle is unknown.
    pub fn project(&mut self, store: &mut BodyStore, dt: f32) -> f32 {
        let Some((a, b)) = store.pair_mut(self.a, self.b) else {
            return 0.0;
        };
        let (w1, w2) = (a.inverse_mass(), b.inverse_mass());
        let alpha = self.compliance / (dt * dt);
        let denominator = w1 + w2 + alpha;
        if w1 + w2 <= 0.0 || denominator <= EPSILON {
            return 0.0;
        }

        let delta = b.position() - a.position();
        let length = delta.length().max(MIN_LENGTH);
        let gradient: Vec3 = delta.scale(1.0 / length);
        let c = length - self.rest_length;
        let d_lambda = (-c - alpha * self.lambda) / denominator;
        self.lambda += d_lambda;

        a.set_position(a.position() - gradient.scale(w1 * d_lambda));
        b.set_position(b.position() + gradient.scale(w2 * d_lambda));
        d_lambda.abs()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use xpbd_core::body::Body;

    fn stretched() -> (BodyStore, BodyId, BodyId) {
        let mut store = BodyStore::new();
        let a = store.insert(Body::new(Vec3::ZERO, 1.0));
        let b = store.insert(Body::new(Vec3::new(2.0, 0.0, 0.0), 1.0));
        (store, a, b)
    }

    #[test]
    fn rigid_constraint_converges_in_one_pass() {
        let (mut store, a, b) = stretched();
        let mut c = DistanceConstraint::rigid(a, b, 1.0).unwrap();
        c.project(&mut store, 1.0 / 60.0);
        assert!((c.current_length(&store).unwrap() - 1.0).abs() < 1e-6);
        // equal masses meet in the middle
        assert!((store.get(a).unwrap().position().x() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn compliance_softens_the_correction() {
        let (mut store, a, b) = stretched();
        let mut c = DistanceConstraint::new(a, b, 1.0, 1000.0).unwrap();
        c.project(&mut store, 1.0 / 60.0);
        let len = c.current_length(&store).unwrap();
        assert!(len > 1.0 && len < 2.0);
    }

    #[test]
    fn immovable_anchor_leaves_all_motion_to_the_other_end() {
        let mut store = BodyStore::new();
        let a = store.insert(Body::new(Vec3::ZERO, 0.0));
        let b = store.insert(Body::new(Vec3::new(0.0, -3.0, 0.0), 1.0));
        let mut c = DistanceConstraint::rigid(a, b, 1.0).unwrap();
        c.project(&mut store, 1.0 / 60.0);
        assert_eq!(store.get(a).unwrap().position(), Vec3::ZERO);
        assert!((store.get(b).unwrap().position().y() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_parameters() {
        let (a, b) = (BodyId::from_raw(0), BodyId::from_raw(1));
        assert!(matches!(
            DistanceConstraint::rigid(a, a, 1.0),
            Err(SimError::SelfConstraint(_))
        ));
        assert!(DistanceConstraint::new(a, b, 1.0, 0.0).is_err());
        assert!(DistanceConstraint::rigid(a, b, -1.0).is_err());
        assert!(DistanceConstraint::new(a, b, 1.0, f32::INFINITY).is_ok());
    }
}
