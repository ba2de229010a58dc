// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-tick summaries and body snapshots for callers that render or log.

use serde::Serialize;
use xpbd_core::body::{Body, BodyId};

/// What happened during one [`crate::system::XpbdSystem::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickReport {
    /// Zero-based index of the tick.
    pub tick: u64,
    /// Broad-phase candidate pairs.
    pub candidate_pairs: usize,
    /// Narrow-phase confirmed contacts between bodies.
    pub contacts: usize,
    /// Contacts whose depth came from the centre-offset fallback.
    pub fallback_contacts: usize,
    /// Bodies touching the world ground plane.
    pub ground_contacts: usize,
    /// Impulses applied (pairs, half-spaces, and ground).
    pub impulses: usize,
    /// Bodies that came to rest.
    pub settled: usize,
    /// Resting bodies woken by a contact impulse.
    pub woken: usize,
}

impl TickReport {
    /// Empty report for `tick`.
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }
}

/// Plain-data view of a body after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodySnapshot {
    /// Raw body handle.
    pub id: u32,
    /// World position.
    pub position: [f32; 3],
    /// Orientation as `[x, y, z, w]`.
    pub orientation: [f32; 4],
    /// Linear velocity.
    pub linear_velocity: [f32; 3],
    /// Angular velocity.
    pub angular_velocity: [f32; 3],
    /// `true` while the body is resting.
    pub resting: bool,
}

impl BodySnapshot {
    /// Captures `body`.
    pub fn capture(id: BodyId, body: &Body) -> Self {
        Self {
            id: id.value(),
            position: body.position().to_array(),
            orientation: body.orientation().to_array(),
            linear_velocity: body.linear_velocity().to_array(),
            angular_velocity: body.angular_velocity().to_array(),
            resting: body.is_resting(),
        }
    }
}
