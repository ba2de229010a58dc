// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! End-to-end behaviour of the tick pipeline.

use std::sync::Arc;

use proptest::prelude::*;
use xpbd_core::body::{Body, BodyId, MotionState};
use xpbd_core::math::Vec3;
use xpbd_core::shape::Shape;
use xpbd_sim::{DistanceConstraint, GroundPlane, SimConfig, XpbdSystem};

const G: f32 = 9.81;

fn frictionless_space() -> SimConfig {
    SimConfig {
        gravity: [0.0, 0.0, 0.0],
        damping: 1.0,
        restitution: 1.0,
        friction: 0.0,
        restitution_threshold: 0.0,
        rest_speed: 0.0,
        wake_speed: 0.0,
        ..SimConfig::default()
    }
}

fn sphere(radius: f32) -> Arc<Shape> {
    Arc::new(Shape::sphere(radius).unwrap())
}

fn cube(half: f32) -> Arc<Shape> {
    Arc::new(Shape::cuboid(half, half, half).unwrap())
}

fn velocity(sys: &XpbdSystem, id: BodyId) -> Vec3 {
    sys.body(id).unwrap().linear_velocity()
}

fn position(sys: &XpbdSystem, id: BodyId) -> Vec3 {
    sys.body(id).unwrap().position()
}

#[test]
fn head_on_elastic_collision_conserves_momentum() {
    let mut sys = XpbdSystem::new(frictionless_space()).unwrap();
    let a = sys
        .add_object(
            Body::new(Vec3::new(-0.3, 0.0, 0.0), 1.0)
                .with_shape(sphere(0.1))
                .with_linear_velocity(Vec3::UNIT_X),
        )
        .unwrap();
    let b = sys
        .add_object(
            Body::new(Vec3::new(0.3, 0.0, 0.0), 1.0)
                .with_shape(sphere(0.1))
                .with_linear_velocity(-Vec3::UNIT_X),
        )
        .unwrap();
    sys.initialize();

    let mut contacts = 0;
    for _ in 0..60 {
        contacts += sys.step().contacts;
        let p = velocity(&sys, a) + velocity(&sys, b);
        assert!(p.length() < 1e-4, "momentum drifted: {p:?}");
    }
    assert!(contacts >= 1);
    // the relative normal velocity is reversed
    assert!(velocity(&sys, a).x() < -0.95);
    assert!(velocity(&sys, b).x() > 0.95);
    assert!(position(&sys, a).x() < position(&sys, b).x());
}

#[test]
fn free_fall_matches_discrete_and_continuous_closed_forms() {
    let config = SimConfig {
        damping: 1.0,
        ..SimConfig::default()
    };
    let dt = config.time_step;
    let mut sys = XpbdSystem::new(config).unwrap();
    let id = sys.add_object(Body::new(Vec3::new(0.0, 10.0, 0.0), 1.0)).unwrap();
    sys.initialize();

    for n in 1..=90u32 {
        sys.step();
        let n = n as f32;
        let y = position(&sys, id).y();
        // semi-implicit Euler: y_n = y_0 − g·dt²·n(n+1)/2
        let discrete = 10.0 - G * dt * dt * n * (n + 1.0) / 2.0;
        assert!((y - discrete).abs() < 1e-3, "tick {n}: {y} vs {discrete}");
        let t = n * dt;
        let continuous = 10.0 - 0.5 * G * t * t;
        assert!((y - continuous).abs() <= G * t * dt + 1e-3);
        assert!((velocity(&sys, id).y() + G * t).abs() < 1e-3);
    }
}

#[test]
fn damping_scales_velocity_each_tick() {
    let config = SimConfig {
        gravity: [0.0, 0.0, 0.0],
        ..SimConfig::default()
    };
    let mut sys = XpbdSystem::new(config).unwrap();
    let id = sys
        .add_object(Body::new(Vec3::ZERO, 1.0).with_linear_velocity(Vec3::UNIT_X))
        .unwrap();
    sys.step();
    assert!((velocity(&sys, id).x() - 0.8).abs() < 1e-6);
    sys.step();
    assert!((velocity(&sys, id).x() - 0.64).abs() < 1e-6);
}

#[test]
fn ground_rebound_is_scaled_by_restitution() {
    let config = SimConfig {
        damping: 1.0,
        friction: 0.0,
        ground: Some(GroundPlane::default()),
        ..SimConfig::default()
    };
    let dt = config.time_step;
    let mut sys = XpbdSystem::new(config).unwrap();
    let id = sys
        .add_object(Body::new(Vec3::new(0.0, 1.0, 0.0), 1.0).with_shape(sphere(0.1)))
        .unwrap();
    sys.initialize();

    let mut previous = velocity(&sys, id).y();
    for _ in 0..120 {
        let report = sys.step();
        let now = velocity(&sys, id).y();
        if now > 0.0 {
            assert_eq!(report.ground_contacts, 1);
            let impact = previous - G * dt;
            assert!((now + 0.6 * impact).abs() < 1e-4, "{now} vs {impact}");
            // lifted back onto the plane before integration
            let bottom = position(&sys, id).y() - 0.1;
            assert!(bottom >= -0.1 - 1e-5);
            return;
        }
        previous = now;
    }
    panic!("sphere never bounced");
}

#[test]
fn box_settles_on_ground_and_stays_put() {
    let config = SimConfig {
        ground: Some(GroundPlane::default()),
        ..SimConfig::default()
    };
    let mut sys = XpbdSystem::new(config).unwrap();
    let id = sys
        .add_object(Body::new(Vec3::new(0.0, 0.5, 0.0), 1.0).with_shape(cube(0.1)))
        .unwrap();
    sys.initialize();

    let settled_at = (0..300).find(|_| sys.step().settled > 0);
    assert!(settled_at.is_some(), "box never came to rest");
    let body = sys.body(id).unwrap();
    assert_eq!(body.motion_state(), MotionState::Resting);
    let rest_y = body.position().y();
    assert!(rest_y.abs() < 0.02, "rest height {rest_y}");

    sys.run(30);
    assert_eq!(position(&sys, id).y(), rest_y);
    assert_eq!(velocity(&sys, id), Vec3::ZERO);
}

#[test]
fn pushing_a_resting_body_wakes_it() {
    let config = SimConfig {
        ground: Some(GroundPlane::default()),
        ..SimConfig::default()
    };
    let mut sys = XpbdSystem::new(config).unwrap();
    let id = sys
        .add_object(Body::new(Vec3::new(0.0, 0.2, 0.0), 1.0).with_shape(cube(0.1)))
        .unwrap();
    assert!((0..300).any(|_| sys.step().settled > 0));
    sys.body_mut(id).unwrap().set_linear_velocity(Vec3::new(0.0, 3.0, 0.0));
    sys.step();
    assert!(position(&sys, id).y() > 0.02);
    assert_eq!(sys.body(id).unwrap().motion_state(), MotionState::Active);
}

#[test]
fn sphere_lands_on_fixed_slab() {
    let mut sys = XpbdSystem::new(SimConfig::default()).unwrap();
    let slab = sys
        .add_object(
            Body::new(Vec3::new(0.0, -0.5, 0.0), 10.0)
                .with_shape(Arc::new(Shape::cuboid(2.0, 0.5, 2.0).unwrap()))
                .fixed(),
        )
        .unwrap();
    let ball = sys
        .add_object(Body::new(Vec3::new(0.0, 0.4, 0.0), 1.0).with_shape(sphere(0.1)))
        .unwrap();
    sys.initialize();

    let mut contacts = 0;
    for _ in 0..300 {
        contacts += sys.step().contacts;
    }
    assert!(contacts > 0);
    let y = position(&sys, ball).y();
    assert!(y > 0.05 && y < 0.12, "ball ended at {y}");
    assert_eq!(position(&sys, slab), Vec3::new(0.0, -0.5, 0.0));
    assert!(sys.body(ball).unwrap().is_resting());
}

fn slab() -> Body {
    Body::new(Vec3::new(0.0, -0.5, 0.0), 0.0)
        .with_shape(Arc::new(Shape::cuboid(2.0, 0.5, 2.0).unwrap()))
        .fixed()
}

#[test]
fn box_stack_on_fixed_slab_comes_to_rest() {
    for levels in [2u8, 3] {
        let mut sys = XpbdSystem::new(SimConfig::default()).unwrap();
        sys.add_object(slab()).unwrap();
        let boxes: Vec<BodyId> = (0..levels)
            .map(|level| {
                let y = 0.15 + f32::from(level) * 0.3;
                sys.add_object(Body::new(Vec3::new(0.0, y, 0.0), 1.0).with_shape(cube(0.1)))
                    .unwrap()
            })
            .collect();
        sys.initialize();
        sys.run(600);

        // each box sits on the top face of the one below, the first on the slab
        let mut support = 0.0f32;
        for &id in &boxes {
            let body = sys.body(id).unwrap();
            assert_eq!(body.motion_state(), MotionState::Resting, "{levels} boxes: {id} never rested");
            assert_eq!(body.linear_velocity(), Vec3::ZERO);
            let bottom = body.position().y() - 0.1;
            assert!(support - bottom < 1e-3, "{levels} boxes: {id} sunk {}", support - bottom);
            assert!(bottom - support < 1e-2, "{levels} boxes: {id} hovers {}", bottom - support);
            support = bottom + 0.2;
        }

        let report = sys.step();
        assert_eq!(report.impulses, 0);
        assert_eq!(report.contacts, 0);
    }
}

fn drifting() -> SimConfig {
    SimConfig {
        gravity: [0.0, 0.0, 0.0],
        damping: 1.0,
        ..SimConfig::default()
    }
}

fn resting_box_under(sys: &mut XpbdSystem, approach: f32) -> (BodyId, BodyId) {
    let mut lower = Body::new(Vec3::new(0.0, 0.1, 0.0), 1.0).with_shape(cube(0.1));
    lower.rest();
    let lower = sys.add_object(lower).unwrap();
    let upper = sys
        .add_object(
            Body::new(Vec3::new(0.0, 0.299, 0.0), 1.0)
                .with_shape(cube(0.1))
                .with_linear_velocity(Vec3::new(0.0, -approach, 0.0)),
        )
        .unwrap();
    sys.initialize();
    (lower, upper)
}

#[test]
fn gentle_landing_leaves_resting_support_in_place() {
    let mut sys = XpbdSystem::new(drifting()).unwrap();
    let (lower, upper) = resting_box_under(&mut sys, 0.1);
    let report = sys.step();
    assert_eq!(report.woken, 0);
    assert!(sys.body(lower).unwrap().is_resting());
    assert_eq!(position(&sys, lower), Vec3::new(0.0, 0.1, 0.0));
    // the landing box is stopped and lifted onto the top face
    assert!(sys.body(upper).unwrap().is_resting());
    assert!((position(&sys, upper).y() - 0.3).abs() < 1e-5);
}

#[test]
fn hard_landing_wakes_resting_support() {
    let mut sys = XpbdSystem::new(drifting()).unwrap();
    let (lower, upper) = resting_box_under(&mut sys, 2.0);
    let report = sys.step();
    assert_eq!(report.woken, 1);
    assert_eq!(sys.body(lower).unwrap().motion_state(), MotionState::Active);
    assert!(velocity(&sys, lower).y() < -1.0);
    assert!(velocity(&sys, upper).y() > velocity(&sys, lower).y());
}

#[test]
fn fixed_bodies_ignore_gravity() {
    let mut sys = XpbdSystem::default();
    let id = sys.add_object(Body::new(Vec3::new(0.0, 1.0, 0.0), 1.0).fixed()).unwrap();
    sys.run(10);
    assert_eq!(position(&sys, id), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn rigid_pendulum_keeps_its_length() {
    let config = SimConfig {
        damping: 1.0,
        ..SimConfig::default()
    };
    let mut sys = XpbdSystem::new(config).unwrap();
    let anchor = sys.add_object(Body::new(Vec3::ZERO, 0.0)).unwrap();
    let bob = sys.add_object(Body::new(Vec3::new(1.0, 0.0, 0.0), 1.0)).unwrap();
    let c = DistanceConstraint::rigid(anchor, bob, 1.0).unwrap();
    sys.add_distance_constraint(c).unwrap();
    sys.initialize();

    let mut lowest = 0.0f32;
    for _ in 0..120 {
        sys.step();
        let length = sys.constraints()[0].current_length(sys.store()).unwrap();
        assert!((length - 1.0).abs() < 1e-4, "length {length}");
        lowest = lowest.min(position(&sys, bob).y());
    }
    assert!(lowest < -0.9);
    assert_eq!(position(&sys, anchor), Vec3::ZERO);
}

#[test]
fn constraint_with_unknown_body_is_rejected() {
    let mut sys = XpbdSystem::default();
    let a = sys.add_object(Body::new(Vec3::ZERO, 1.0)).unwrap();
    let c = DistanceConstraint::rigid(a, BodyId::from_raw(7), 1.0).unwrap();
    assert!(sys.add_distance_constraint(c).is_err());
    assert!(sys.constraints().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimConfig {
        time_step: -1.0,
        ..SimConfig::default()
    };
    assert!(XpbdSystem::new(config).is_err());
}

#[test]
fn config_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");
    std::fs::write(&path, r#"{"gravity": [0.0, -1.0, 0.0], "ground": {"height": 0.5}}"#).unwrap();
    let cfg = SimConfig::load_json(&path).unwrap();
    assert_eq!(cfg.gravity, [0.0, -1.0, 0.0]);
    assert_eq!(cfg.ground.unwrap().height, 0.5);
    assert!(SimConfig::load_json(dir.path().join("missing.json")).is_err());
}

#[test]
fn snapshots_follow_handle_order() {
    let mut sys = XpbdSystem::default();
    sys.add_object(Body::new(Vec3::new(1.0, 0.0, 0.0), 1.0)).unwrap();
    sys.add_object(Body::new(Vec3::new(2.0, 0.0, 0.0), 1.0)).unwrap();
    let snap = sys.snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].id, 0);
    assert_eq!(snap[1].position, [2.0, 0.0, 0.0]);
    assert_eq!(snap[0].orientation, [0.0, 0.0, 0.0, 1.0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn spinning_body_keeps_unit_orientation(
        wx in -20.0f32..20.0,
        wy in -20.0f32..20.0,
        wz in -20.0f32..20.0,
    ) {
        let mut sys = XpbdSystem::new(frictionless_space()).unwrap();
        let id = sys
            .add_object(Body::new(Vec3::ZERO, 1.0).with_angular_velocity(Vec3::new(wx, wy, wz)))
            .unwrap();
        sys.run(30);
        let q = sys.body(id).unwrap().orientation();
        prop_assert!((q.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn elastic_pairs_conserve_momentum(
        speed in 0.5f32..3.0,
        offset in -0.05f32..0.05,
        mass_b in 0.5f32..4.0,
    ) {
        let mut sys = XpbdSystem::new(frictionless_space()).unwrap();
        let a = sys
            .add_object(
                Body::new(Vec3::new(-0.3, offset, 0.0), 1.0)
                    .with_shape(sphere(0.1))
                    .with_linear_velocity(Vec3::new(speed, 0.0, 0.0)),
            )
            .unwrap();
        let b = sys
            .add_object(Body::new(Vec3::new(0.3, 0.0, 0.0), mass_b).with_shape(sphere(0.1)))
            .unwrap();
        let before = velocity(&sys, a) + velocity(&sys, b).scale(mass_b);
        sys.run(40);
        let after = velocity(&sys, a) + velocity(&sys, b).scale(mass_b);
        prop_assert!((after - before).length() < 1e-3 * speed.max(1.0) * mass_b.max(1.0));
    }
}
