// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exact convex narrow phase: GJK decides overlap, EPA measures it.

use tracing::{debug, warn};
use xpbd_core::body::Body;
use xpbd_core::math::Vec3;

#[doc = "Expanding Polytope Algorithm."]
pub mod epa;
#[doc = "Gilbert–Johnson–Keerthi intersection."]
pub mod gjk;
#[doc = "Support mappings for shapes and bodies."]
pub mod support;

use support::{BodySupport, SupportMap};

/// Where a contact's depth and normal came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContactSource {
    /// EPA converged.
    Epa,
    /// EPA failed; the normal is the centre-to-centre direction and depth is 0.
    Fallback,
}

/// Result of a confirmed narrow-phase overlap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Contact {
    /// Unit contact normal.
    pub normal: Vec3,
    /// Penetration depth (≥ 0).
    pub depth: f32,
    /// Deepest point on the first shape (world space).
    pub point_a: Vec3,
    /// Deepest point on the second shape (world space).
    pub point_b: Vec3,
    /// How the contact was derived.
    pub source: ContactSource,
}

impl Contact {
    /// Returns the contact with its normal flipped if it disagrees with
    /// `direction` (typically the first-to-second centre offset).
    pub fn oriented_along(mut self, direction: &Vec3) -> Self {
        if self.normal.dot(direction) < 0.0 {
            self.normal = -self.normal;
        }
        self
    }
}

/// GJK + EPA with configurable caps.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NarrowPhase {
    gjk_max_iterations: u32,
    epa_max_iterations: u32,
    epa_tolerance: f32,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::new(
            gjk::DEFAULT_MAX_ITERATIONS,
            epa::DEFAULT_MAX_ITERATIONS,
            epa::DEFAULT_TOLERANCE,
        )
    }
}

impl NarrowPhase {
    /// Creates a narrow phase with explicit iteration caps and tolerance.
    pub fn new(gjk_max_iterations: u32, epa_max_iterations: u32, epa_tolerance: f32) -> Self {
        Self {
            gjk_max_iterations,
            epa_max_iterations,
            epa_tolerance,
        }
    }

    /// Tests two support mappings.
    ///
    /// Returns `None` when GJK finds no overlap. When GJK confirms overlap
    /// but EPA fails, the contact falls back to the normalised centre offset
    /// with zero depth and [`ContactSource::Fallback`].
    pub fn detect<A, B>(&self, a: &A, b: &B) -> Option<Contact>
    where
        A: SupportMap + ?Sized,
        B: SupportMap + ?Sized,
    {
        let simplex = gjk::intersect(a, b, self.gjk_max_iterations)?;
        match epa::penetration(a, b, &simplex, self.epa_max_iterations, self.epa_tolerance) {
            Ok(pen) => {
                debug!(depth = pen.depth, iterations = pen.iterations, "epa converged");
                Some(Contact {
                    normal: pen.normal,
                    depth: pen.depth,
                    point_a: pen.witness_a,
                    point_b: pen.witness_b,
                    source: ContactSource::Epa,
                })
            }
            Err(err) => {
                warn!(error = %err, "epa failed; using centre-offset contact");
                let (ca, cb) = (a.center(), b.center());
                Some(Contact {
                    normal: (cb - ca).normalize_or(Vec3::UNIT_Y),
                    depth: 0.0,
                    point_a: ca,
                    point_b: cb,
                    source: ContactSource::Fallback,
                })
            }
        }
    }

    /// Tests two bodies through their support mappings.
    pub fn detect_collision(&self, a: &Body, b: &Body) -> Option<Contact> {
        self.detect(&BodySupport::new(a), &BodySupport::new(b))
    }
}
