// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `Active` ⇄ `Resting` transitions.
//!
//! A body only comes to rest after touching something and dropping below
//! `rest_speed`. It wakes when a contact impulse leaves it faster than
//! `wake_speed`, or when the caller sets a velocity or adds a force. The gap
//! between the two thresholds stops a settled body from flickering.
//!
//! A resting body that a contact would not wake [`holds`]: the other body
//! treats it as immovable for that contact.

use xpbd_core::body::Body;
use xpbd_core::math::Vec3;

/// State change reported by [`settle`] and [`after_impulse`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No change.
    Unchanged,
    /// The body went to rest.
    Settled,
    /// The body woke up.
    Woke,
}

/// Puts a touching, slow, active body to rest.
pub fn settle(body: &mut Body, rest_speed: f32) -> Transition {
    if !body.is_movable() || body.is_resting() {
        return Transition::Unchanged;
    }
    if body.linear_velocity().length() < rest_speed {
        body.rest();
        Transition::Settled
    } else {
        Transition::Unchanged
    }
}

/// Applies hysteresis to a body that was resting before an impulse: it wakes
/// only if the impulse left it faster than `wake_speed`, otherwise it is
/// pinned back to zero velocity.
pub fn after_impulse(body: &mut Body, was_resting: bool, wake_speed: f32) -> Transition {
    if !was_resting {
        return Transition::Unchanged;
    }
    if body.linear_velocity().length() > wake_speed {
        body.wake();
        Transition::Woke
    } else {
        body.rest();
        Transition::Unchanged
    }
}

/// `true` when `body` is resting and `impulse` would leave it no faster
/// than `wake_speed`.
pub fn holds(body: &Body, impulse: Option<Vec3>, wake_speed: f32) -> bool {
    body.is_resting() && impulse.map_or(0.0, |j| j.length() * body.inverse_mass()) <= wake_speed
}
