// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The per-tick pipeline.
//!
//! [`XpbdSystem::step`] runs, in order: forces and damping, broad-phase
//! refresh, `contact_iterations` passes of narrow phase and contact
//! resolution (pairs, immovable half-spaces, then the world ground plane),
//! integration, and distance constraints. A body settles as soon as one of
//! its contacts leaves it slower than `rest_speed`, so bodies resolved later
//! in the same pass can lean on it. Nothing persists between ticks except
//! body state and the broad-phase tree.

use tracing::{debug, info, instrument, warn};
use xpbd_core::body::{Body, BodyId, BodyStore};
use xpbd_core::math::{Quat, Vec3};
use xpbd_geom::narrow::{Contact, ContactSource};
use xpbd_geom::{BodyPair, DynamicAabbTree, NarrowPhase};

use crate::config::SimConfig;
use crate::constraint::DistanceConstraint;
use crate::contact::{self, Response};
use crate::error::SimError;
use crate::half_space::{self, HalfSpace};
use crate::report::{BodySnapshot, TickReport};
use crate::rest::{self, Transition};

/// Owns the bodies, the broad phase, and the constraints, and advances them
/// one fixed step at a time.
#[derive(Debug)]
pub struct XpbdSystem {
    config: SimConfig,
    bodies: BodyStore,
    broad: DynamicAabbTree,
    narrow: NarrowPhase,
    constraints: Vec<DistanceConstraint>,
    pairs: Vec<BodyPair>,
    tick: u64,
}

impl Default for XpbdSystem {
    fn default() -> Self {
        Self::from_valid_config(SimConfig::default())
    }
}

impl XpbdSystem {
    /// Creates an empty system after validating `config`.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SimConfig) -> Self {
        let narrow = config.narrow_phase();
        Self {
            config,
            bodies: BodyStore::new(),
            broad: DynamicAabbTree::new(),
            narrow,
            constraints: Vec::new(),
            pairs: Vec::new(),
            tick: 0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Registers a body with the store and the broad phase.
    pub fn add_object(&mut self, body: Body) -> Result<BodyId, SimError> {
        let id = self.bodies.insert(body);
        self.broad.add_object(&self.bodies, id)?;
        debug!(body = %id, "registered body");
        Ok(id)
    }

    /// Adds a distance constraint between two registered bodies.
    pub fn add_distance_constraint(&mut self, constraint: DistanceConstraint) -> Result<usize, SimError> {
        let (a, b) = constraint.bodies();
        for id in [a, b] {
            if let Err(err) = self.bodies.try_get(id) {
                warn!(body = %id, "constraint rejected: unknown body");
                return Err(err.into());
            }
        }
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    /// Re-derives mass properties of every body and refits the broad phase.
    pub fn initialize(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.recompute_mass_properties();
        }
        self.broad.update(&self.bodies);
        info!(
            bodies = self.bodies.len(),
            constraints = self.constraints.len(),
            "xpbd system initialized"
        );
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Bodies in handle order, for rendering.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.bodies.iter()
    }

    /// The body store.
    pub fn store(&self) -> &BodyStore {
        &self.bodies
    }

    /// Shared access to one body.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Mutable access to one body, e.g. to push it between ticks.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    /// Registered distance constraints.
    pub fn constraints(&self) -> &[DistanceConstraint] {
        &self.constraints
    }

    /// The broad-phase tree.
    pub fn broad_phase(&self) -> &DynamicAabbTree {
        &self.broad
    }

    /// Plain-data views of every body.
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(id, body)| BodySnapshot::capture(id, body))
            .collect()
    }

    /// Runs `ticks` steps and returns their reports.
    pub fn run(&mut self, ticks: u32) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step()).collect()
    }

    /// Advances the simulation by one fixed step.
    #[instrument(skip_all)]
    pub fn step(&mut self) -> TickReport {
        let dt = self.config.time_step;
        let mut report = TickReport::new(self.tick);

        self.apply_forces(dt);

        self.broad.update(&self.bodies);
        let mut pairs = std::mem::take(&mut self.pairs);
        pairs.clear();
        self.broad.collect_collision_pairs(&mut pairs);
        report.candidate_pairs = pairs.len();

        for pass in 0..self.config.contact_iterations {
            // Contacts are counted on the first pass only.
            let first = pass == 0;
            for &(a, b) in &pairs {
                self.resolve_candidate(a, b, first, &mut report);
            }
            self.resolve_ground(first, &mut report);
        }
        self.pairs = pairs;

        self.integrate(dt);
        self.solve_constraints(dt);

        debug!(
            tick = report.tick,
            candidate_pairs = report.candidate_pairs,
            contacts = report.contacts,
            fallback_contacts = report.fallback_contacts,
            ground_contacts = report.ground_contacts,
            settled = report.settled,
            "tick complete"
        );
        self.tick += 1;
        report
    }

    /// Gravity, accumulated force and torque, then damping, for awake bodies.
    fn apply_forces(&mut self, dt: f32) {
        let gravity = self.config.gravity_vec();
        let damping = self.config.damping;
        for (_, body) in self.bodies.iter_mut() {
            if body.is_movable() && !body.is_resting() {
                let linear = (gravity + body.force().scale(body.inverse_mass())).scale(dt);
                let angular = body.world_inverse_inertia().mul_vec(&body.torque()).scale(dt);
                body.apply_velocity_delta(linear, angular);
                body.damp(damping);
            }
            body.clear_forces();
        }
    }

    fn resolve_candidate(&mut self, a: BodyId, b: BodyId, first: bool, report: &mut TickReport) {
        let (Some(body_a), Some(body_b)) = (self.bodies.get(a), self.bodies.get(b)) else {
            return;
        };
        let awake = |body: &Body| body.is_movable() && !body.is_resting();
        if !awake(body_a) && !awake(body_b) {
            return;
        }
        let Some(contact) = self.narrow.detect_collision(body_a, body_b) else {
            return;
        };
        let contact = contact.oriented_along(&(body_b.position() - body_a.position()));
        if first {
            report.contacts += 1;
            if contact.source == ContactSource::Fallback {
                report.fallback_contacts += 1;
            }
            debug!(a = %a, b = %b, depth = contact.depth, source = ?contact.source, "contact");
        }

        let Some((body_a, body_b)) = self.bodies.pair_mut(a, b) else {
            return;
        };
        let config = &self.config;
        let applied = match (body_a.is_movable(), body_b.is_movable()) {
            (true, true) => resolve_movable_pair(body_a, body_b, &contact, config, report),
            (true, false) => resolve_against_immovable(body_a, body_b, &-contact.normal, config),
            (false, true) => resolve_against_immovable(body_b, body_a, &contact.normal, config),
            (false, false) => false,
        };
        if applied {
            report.impulses += 1;
        }
        for (id, body) in [(a, body_a), (b, body_b)] {
            if rest::settle(body, config.rest_speed) == Transition::Settled {
                debug!(body = %id, "body settled");
                report.settled += 1;
            }
        }
    }

    fn resolve_ground(&mut self, first: bool, report: &mut TickReport) {
        let Some(ground) = self.config.ground else {
            return;
        };
        let plane = HalfSpace::from_ground(&ground);
        let response = Response::from_config(&self.config).with_restitution(ground.restitution);
        for (id, body) in self.bodies.iter_mut() {
            if !body.is_movable() || body.is_resting() {
                continue;
            }
            let Some(hit) = half_space::resolve(body, &plane, &response, self.config.positional_correction) else {
                continue;
            };
            if first {
                report.ground_contacts += 1;
            }
            if hit.impulse.is_some() {
                report.impulses += 1;
            }
            if rest::settle(body, self.config.rest_speed) == Transition::Settled {
                debug!(body = %id, "body settled on the ground");
                report.settled += 1;
            }
        }
    }

    /// Semi-implicit Euler on awake bodies:
    /// `x += v·dt`, `q ← normalize(q + (½·dt·ω, 0) ⊗ q)`.
    fn integrate(&mut self, dt: f32) {
        for (_, body) in self.bodies.iter_mut() {
            if !body.is_movable() || body.is_resting() {
                continue;
            }
            let position = body.position() + body.linear_velocity().scale(dt);
            let q = body.orientation();
            let spin = Quat::from_pure(body.angular_velocity().scale(0.5 * dt)).multiply(&q);
            body.set_pose(position, q.add(&spin));
        }
    }

    /// Relaxes distance constraints on positions, then feeds the net
    /// displacement back into velocity.
    fn solve_constraints(&mut self, dt: f32) {
        if self.constraints.is_empty() {
            return;
        }
        let before: Vec<Vec3> = self.bodies.iter().map(|(_, b)| b.position()).collect();
        for constraint in &mut self.constraints {
            constraint.reset();
        }
        for _ in 0..self.config.constraint_iterations {
            for constraint in &mut self.constraints {
                constraint.project(&mut self.bodies, dt);
            }
        }
        for ((_, body), start) in self.bodies.iter_mut().zip(before) {
            let correction = (body.position() - start).scale(1.0 / dt);
            if correction.length_squared() == 0.0 {
                continue;
            }
            if body.is_resting() {
                if correction.length() <= self.config.wake_speed {
                    continue;
                }
                body.wake();
            }
            body.apply_velocity_delta(correction, Vec3::ZERO);
        }
    }
}

/// Contact between two movable bodies. A resting body that the impulse
/// would not wake stays put and acts as an immovable support; otherwise
/// both bodies share the impulse and the positional correction. Returns
/// `true` when an impulse was applied.
fn resolve_movable_pair(
    a: &mut Body,
    b: &mut Body,
    contact: &Contact,
    config: &SimConfig,
    report: &mut TickReport,
) -> bool {
    let resting = (a.is_resting(), b.is_resting());
    if resting.0 != resting.1 {
        let kick = contact::pair_impulse(a, b, contact, config);
        if rest::holds(a, kick, config.wake_speed) {
            return resolve_against_immovable(b, a, &contact.normal, config);
        }
        if rest::holds(b, kick, config.wake_speed) {
            return resolve_against_immovable(a, b, &-contact.normal, config);
        }
    }
    let outcome = contact::resolve_pair(a, b, contact, config);
    if outcome.impulse.is_none() {
        return false;
    }
    for (body, was_resting) in [(a, resting.0), (b, resting.1)] {
        if rest::after_impulse(body, was_resting, config.wake_speed) == Transition::Woke {
            report.woken += 1;
        }
    }
    true
}

/// Half-space contact of `moving` against the supporting plane of `fixed`
/// facing `normal` (from `fixed` towards `moving`). Returns `true` when an
/// impulse was applied.
fn resolve_against_immovable(moving: &mut Body, fixed: &Body, normal: &Vec3, config: &SimConfig) -> bool {
    let plane = HalfSpace::supporting(fixed, normal);
    let response = Response::from_config(config);
    half_space::resolve(moving, &plane, &response, config.positional_correction)
        .is_some_and(|hit| hit.impulse.is_some())
}
