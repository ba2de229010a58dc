// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid bodies and the arena that owns them.
//!
//! A [`Body`] carries motion state only; all behaviour lives in the solver.
//! Bodies are addressed by [`BodyId`], a stable index into a [`BodyStore`],
//! so pair identity never depends on memory layout.

use core::fmt;
use std::sync::Arc;

use crate::error::BodyError;
use crate::mass::reference_inertia;
use crate::math::{Mat3, Mat4, Quat, Vec3};
use crate::mesh::Mesh;
use crate::shape::Shape;

/// Stable handle to a body inside a [`BodyStore`].
///
/// Ordering follows insertion order and is used to canonicalise pairs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u32);

impl BodyId {
    /// Wraps a raw index. Mostly useful in tests; real handles come from
    /// [`BodyStore::insert`].
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value.
    pub const fn value(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Coarse activity state with hysteresis, replacing an inline velocity clamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MotionState {
    /// Integrated and affected by forces every tick.
    #[default]
    Active,
    /// Velocities held at zero; skipped by the force pass and integrator
    /// until woken by an impulse, a velocity change, or a force.
    Resting,
}

/// Rigid body motion state plus mass properties.
#[derive(Debug, Clone)]
pub struct Body {
    mesh: Option<Arc<Mesh>>,
    shape: Option<Arc<Shape>>,
    position: Vec3,
    orientation: Quat,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    mass: f32,
    inverse_mass: f32,
    inertia_ref: Mat3,
    force: Vec3,
    torque: Vec3,
    fixed: bool,
    motion: MotionState,
}

impl Body {
    /// Creates a free body at `position` with the given mass and no geometry.
    ///
    /// A mass of zero (or below) yields an immovable body.
    pub fn new(position: Vec3, mass: f32) -> Self {
        let mut body = Self {
            mesh: None,
            shape: None,
            position,
            orientation: Quat::identity(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            inverse_mass: 0.0,
            inertia_ref: Mat3::identity(),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            fixed: false,
            motion: MotionState::Active,
        };
        body.recompute_mass_properties();
        body
    }

    /// Attaches the render mesh used for bounds, inertia, and vertex contact.
    pub fn with_mesh(mut self, mesh: Arc<Mesh>) -> Self {
        self.mesh = Some(mesh);
        self.recompute_mass_properties();
        self
    }

    /// Attaches the convex shape used by the narrow phase.
    pub fn with_shape(mut self, shape: Arc<Shape>) -> Self {
        self.shape = Some(shape);
        self.recompute_mass_properties();
        self
    }

    /// Sets the initial orientation (normalised).
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Sets the initial linear velocity.
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Marks the body immovable (infinite mass).
    pub fn fixed(mut self) -> Self {
        self.set_fixed(true);
        self
    }

    /// Re-derives inverse mass and reference inertia from the current mass
    /// and geometry.
    pub fn recompute_mass_properties(&mut self) {
        let movable = !self.fixed && self.mass.is_finite() && self.mass > 0.0;
        self.inverse_mass = if movable { 1.0 / self.mass } else { 0.0 };
        let mass = if self.mass > 0.0 { self.mass } else { 1.0 };
        self.inertia_ref = reference_inertia(self.mesh.as_deref(), self.shape.as_deref(), mass);
    }

    /// Changes the mass and recomputes inverse mass and inertia.
    pub fn set_mass(&mut self, mass: f32) -> Result<(), BodyError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(BodyError::InvalidMass(mass));
        }
        self.mass = mass;
        self.recompute_mass_properties();
        Ok(())
    }

    /// Toggles immovability. Fixed bodies have zero inverse mass and inertia.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        if fixed {
            self.linear_velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
        self.recompute_mass_properties();
    }

    /// Shared render mesh, if any.
    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        self.mesh.as_ref()
    }

    /// Convex shape, if any.
    pub fn shape(&self) -> Option<&Arc<Shape>> {
        self.shape.as_ref()
    }

    /// World-space position of the body origin.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation as a unit quaternion.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Linear velocity.
    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    /// Angular velocity (world frame, radians per second).
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Mass as supplied by the caller.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Cached inverse mass; zero exactly when the body is immovable.
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Body-space reference inertia tensor.
    pub fn inertia_ref(&self) -> Mat3 {
        self.inertia_ref
    }

    /// Accumulated force for the current tick.
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Accumulated torque for the current tick.
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    /// `true` if the caller pinned the body.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// `true` when the body responds to impulses (inverse mass above zero).
    pub fn is_movable(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Current activity state.
    pub fn motion_state(&self) -> MotionState {
        self.motion
    }

    /// `true` while the body is resting.
    pub fn is_resting(&self) -> bool {
        self.motion == MotionState::Resting
    }

    /// Teleports the body.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Replaces the orientation (normalised).
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
    }

    /// Replaces the linear velocity and wakes the body.
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.is_movable() {
            self.linear_velocity = velocity;
            self.motion = MotionState::Active;
        }
    }

    /// Replaces the angular velocity and wakes the body.
    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.is_movable() {
            self.angular_velocity = velocity;
            self.motion = MotionState::Active;
        }
    }

    /// Adds to the force accumulator and wakes the body.
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
        self.motion = MotionState::Active;
    }

    /// Adds to the torque accumulator and wakes the body.
    pub fn add_torque(&mut self, torque: Vec3) {
        self.torque += torque;
        self.motion = MotionState::Active;
    }

    /// Clears both accumulators.
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Zeroes both velocities and marks the body resting.
    pub fn rest(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.motion = MotionState::Resting;
    }

    /// Returns the body to [`MotionState::Active`].
    pub fn wake(&mut self) {
        self.motion = MotionState::Active;
    }

    /// Rotation matrix `R` of the current orientation.
    pub fn rotation_matrix(&self) -> Mat3 {
        self.orientation.to_mat3()
    }

    /// World-space inertia `R · I_ref · Rᵀ`.
    pub fn world_inertia(&self) -> Mat3 {
        let r = self.rotation_matrix();
        r * self.inertia_ref * r.transpose()
    }

    /// Inverse of the world-space inertia; zero for immovable bodies or a
    /// singular tensor.
    pub fn world_inverse_inertia(&self) -> Mat3 {
        if !self.is_movable() {
            return Mat3::ZERO;
        }
        self.world_inertia().inverse().unwrap_or(Mat3::ZERO)
    }

    /// Column-major model matrix `T · R` for the render collaborator.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(&self.rotation_matrix(), &self.position)
    }

    /// Maps a body-local point to world space.
    pub fn local_to_world(&self, local: &Vec3) -> Vec3 {
        self.position + self.orientation.rotate(local)
    }

    /// Velocity of the material point at `world_point`: `v + ω × r`.
    pub fn velocity_at(&self, world_point: &Vec3) -> Vec3 {
        let r = *world_point - self.position;
        self.linear_velocity + self.angular_velocity.cross(&r)
    }

    /// Applies impulse `j` at lever arm `r` (world frame, relative to the
    /// body origin): `v += j/m`, `ω += I⁻¹ (r × j)`.
    pub fn apply_impulse(&mut self, j: &Vec3, r: &Vec3) {
        if !self.is_movable() {
            return;
        }
        let inv_inertia = self.world_inverse_inertia();
        self.linear_velocity += j.scale(self.inverse_mass);
        self.angular_velocity += inv_inertia.mul_vec(&r.cross(j));
    }

    /// Writes integrated pose; the orientation is re-normalised.
    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation.normalize();
    }

    /// Writes both velocities without touching the motion state.
    pub(crate) fn set_velocities_raw(&mut self, linear: Vec3, angular: Vec3) {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
    }

    /// Applies velocity changes from the solver, ignoring immovable bodies.
    pub fn apply_velocity_delta(&mut self, linear: Vec3, angular: Vec3) {
        if self.is_movable() {
            self.set_velocities_raw(self.linear_velocity + linear, self.angular_velocity + angular);
        }
    }

    /// Multiplies both velocities by `factor`.
    pub fn damp(&mut self, factor: f32) {
        self.set_velocities_raw(
            self.linear_velocity.scale(factor),
            self.angular_velocity.scale(factor),
        );
    }
}

/// Arena of bodies addressed by [`BodyId`]. Bodies are never removed, so
/// handles stay valid for the store's lifetime.
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
}

impl BodyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body and returns its handle.
    pub fn insert(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(body);
        id
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// `true` if no bodies are stored.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// `true` if `id` refers to a stored body.
    pub fn contains(&self, id: BodyId) -> bool {
        id.index() < self.bodies.len()
    }

    /// Shared access to a body.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Mutable access to a body.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    /// Like [`BodyStore::get`] but with a typed error.
    pub fn try_get(&self, id: BodyId) -> Result<&Body, BodyError> {
        self.get(id).ok_or(BodyError::UnknownBody(id))
    }

    /// Mutable access to two distinct bodies at once.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia >= self.bodies.len() || ib >= self.bodies.len() {
            return None;
        }
        if ia < ib {
            let (lo, hi) = self.bodies.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.bodies.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    /// Iterates bodies in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (BodyId(i as u32), b))
    }

    /// Iterates bodies mutably in handle order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut Body)> + '_ {
        self.bodies
            .iter_mut()
            .enumerate()
            .map(|(i, b)| (BodyId(i as u32), b))
    }

    /// All handles in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.bodies.len()).map(|i| BodyId(i as u32))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_mass_means_immovable() {
        let b = Body::new(Vec3::ZERO, 0.0);
        assert_eq!(b.inverse_mass(), 0.0);
        assert!(!b.is_movable());
        let f = Body::new(Vec3::ZERO, 3.0).fixed();
        assert_eq!(f.inverse_mass(), 0.0);
        assert_eq!(f.world_inverse_inertia(), Mat3::ZERO);
    }

    #[test]
    fn impulse_through_center_changes_only_linear_velocity() {
        let mut b = Body::new(Vec3::ZERO, 2.0);
        b.apply_impulse(&Vec3::new(4.0, 0.0, 0.0), &Vec3::ZERO);
        assert_eq!(b.linear_velocity(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(b.angular_velocity(), Vec3::ZERO);
    }

    #[test]
    fn pair_mut_rejects_aliasing_and_preserves_order() {
        let mut store = BodyStore::new();
        let a = store.insert(Body::new(Vec3::new(1.0, 0.0, 0.0), 1.0));
        let b = store.insert(Body::new(Vec3::new(2.0, 0.0, 0.0), 1.0));
        assert!(store.pair_mut(a, a).is_none());
        let (pb, pa) = store.pair_mut(b, a).unwrap();
        assert_eq!(pb.position().x(), 2.0);
        assert_eq!(pa.position().x(), 1.0);
        assert!(store.pair_mut(a, BodyId::from_raw(9)).is_none());
    }

    #[test]
    fn rest_zeroes_velocity_and_setters_wake() {
        let mut b = Body::new(Vec3::ZERO, 1.0).with_linear_velocity(Vec3::UNIT_X);
        b.rest();
        assert!(b.is_resting());
        assert_eq!(b.linear_velocity(), Vec3::ZERO);
        b.set_linear_velocity(Vec3::UNIT_Y);
        assert_eq!(b.motion_state(), MotionState::Active);
    }

    #[test]
    fn model_matrix_places_local_points() {
        let q = Quat::from_axis_angle(Vec3::UNIT_Y, core::f32::consts::FRAC_PI_2);
        let b = Body::new(Vec3::new(0.0, 2.0, 0.0), 1.0).with_orientation(q);
        let local = Vec3::new(1.0, 0.0, 0.0);
        let via_matrix = b.model_matrix().transform_point(&local);
        assert!((via_matrix - b.local_to_world(&local)).length() < 1e-5);
        assert!((via_matrix - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn velocity_at_includes_rotation() {
        let b = Body::new(Vec3::ZERO, 1.0).with_angular_velocity(Vec3::new(0.0, 0.0, 1.0));
        let v = b.velocity_at(&Vec3::UNIT_X);
        assert!((v - Vec3::UNIT_Y).length() < 1e-6);
    }
}
