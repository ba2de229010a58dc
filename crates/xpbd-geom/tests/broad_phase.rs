// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the dynamic AABB tree broad phase.

use std::sync::Arc;

use proptest::prelude::*;
use xpbd_core::body::{Body, BodyId, BodyStore};
use xpbd_core::math::Vec3;
use xpbd_core::mesh::Mesh;
use xpbd_core::shape::Shape;
use xpbd_geom::bounds::world_aabb;
use xpbd_geom::{Aabb, AllPairs, BroadPhase, BroadPhaseError, DynamicAabbTree};

/// UV sphere point cloud like the render collaborator produces.
fn sphere_mesh(radius: f32, sectors: u32, stacks: u32) -> Mesh {
    let mut positions = Vec::new();
    for i in 0..=stacks {
        let phi = core::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..sectors {
            let theta = core::f32::consts::TAU * j as f32 / sectors as f32;
            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }
    Mesh::from_positions(positions)
}

fn mesh_body(store: &mut BodyStore, x: f32) -> BodyId {
    let mesh = Arc::new(sphere_mesh(0.1, 20, 20));
    store.insert(Body::new(Vec3::new(x, 0.0, 0.0), 1.0).with_mesh(mesh))
}

#[test]
fn mesh_aabb_matches_sphere_extent() {
    let mut store = BodyStore::new();
    let a = mesh_body(&mut store, 0.0);
    let mut tree = DynamicAabbTree::new();
    assert!(tree.add_object(&store, a).is_ok());
    tree.update(&store);
    let aabb = store.get(a).map(DynamicAabbTree::compute_aabb);
    let Some(aabb) = aabb else {
        panic!("body missing");
    };
    for (lo, hi) in aabb.min().to_array().into_iter().zip(aabb.max().to_array()) {
        assert!((lo + 0.1).abs() < 1e-3, "min {lo}");
        assert!((hi - 0.1).abs() < 1e-3, "max {hi}");
    }
}

#[test]
fn close_bodies_pair_and_far_bodies_do_not() {
    let mut store = BodyStore::new();
    let a = mesh_body(&mut store, 0.0);
    let b = mesh_body(&mut store, 0.2);
    let mut tree = DynamicAabbTree::new();
    assert!(tree.add_object(&store, a).is_ok());
    assert!(tree.add_object(&store, b).is_ok());
    tree.update(&store);
    let mut pairs = Vec::new();
    tree.collect_collision_pairs(&mut pairs);
    assert_eq!(pairs, vec![(a, b)]);

    if let Some(body) = store.get_mut(b) {
        body.set_position(Vec3::new(0.5, 0.0, 0.0));
    }
    tree.update(&store);
    tree.collect_collision_pairs(&mut pairs);
    assert!(pairs.is_empty());
}

#[test]
fn unknown_and_duplicate_registrations_are_rejected() {
    let mut store = BodyStore::new();
    let a = mesh_body(&mut store, 0.0);
    let mut tree = DynamicAabbTree::new();
    let ghost = BodyId::from_raw(42);
    assert_eq!(tree.add_object(&store, ghost), Err(BroadPhaseError::UnknownBody(ghost)));
    assert!(tree.is_empty());
    assert!(tree.add_object(&store, a).is_ok());
    assert_eq!(tree.add_object(&store, a), Err(BroadPhaseError::AlreadyRegistered(a)));
    assert_eq!(tree.len(), 1);
}

#[test]
fn clear_tears_down_everything() {
    let mut store = BodyStore::new();
    let a = mesh_body(&mut store, 0.0);
    let b = mesh_body(&mut store, 0.1);
    let mut tree = DynamicAabbTree::new();
    assert!(tree.add_object(&store, a).is_ok());
    assert!(tree.add_object(&store, b).is_ok());
    tree.clear();
    assert!(tree.is_empty());
    assert!(tree.pairs().is_empty());
    assert!(tree.is_consistent());
}

#[test]
fn pair_order_is_canonical_regardless_of_insertion_order() {
    let mut tree = DynamicAabbTree::new();
    let id = BodyId::from_raw;
    tree.upsert(id(2), Aabb::cube(Vec3::new(100.0, 0.0, 0.0), 1.0));
    tree.upsert(id(1), Aabb::cube(Vec3::new(1.0, 0.0, 0.0), 1.0));
    tree.upsert(id(0), Aabb::cube(Vec3::ZERO, 1.0));
    assert_eq!(tree.pairs(), vec![(id(0), id(1))]);
    tree.upsert(id(3), Aabb::cube(Vec3::new(0.5, 0.0, 0.0), 1.0));
    assert_eq!(tree.pairs(), vec![(id(0), id(1)), (id(0), id(3)), (id(1), id(3))]);
}

fn arb_box() -> impl Strategy<Value = (f32, f32, f32, f32)> {
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0, 0.1f32..3.0)
}

proptest! {
    #[test]
    fn tree_matches_all_pairs_oracle(
        boxes in prop::collection::vec(arb_box(), 0..40),
        moves in prop::collection::vec((any::<prop::sample::Index>(), arb_box()), 0..10),
    ) {
        let mut tree = DynamicAabbTree::new();
        let mut oracle = AllPairs::new();
        for (i, (x, y, z, h)) in boxes.iter().enumerate() {
            let aabb = Aabb::cube(Vec3::new(*x, *y, *z), *h);
            tree.upsert(BodyId::from_raw(i as u32), aabb);
            oracle.upsert(BodyId::from_raw(i as u32), aabb);
        }
        if !boxes.is_empty() {
            for (which, (x, y, z, h)) in &moves {
                let id = BodyId::from_raw(which.index(boxes.len()) as u32);
                let aabb = Aabb::cube(Vec3::new(*x, *y, *z), *h);
                tree.upsert(id, aabb);
                oracle.upsert(id, aabb);
            }
        }
        prop_assert!(tree.is_consistent());
        let pairs = tree.pairs();
        prop_assert_eq!(&pairs, &oracle.pairs());
        prop_assert!(pairs.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(pairs.iter().all(|(a, b)| a < b));
    }

    #[test]
    fn update_refits_every_internal_node(
        starts in prop::collection::vec((-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0), 1..25),
        offsets in prop::collection::vec((-3.0f32..3.0, -3.0f32..3.0, -3.0f32..3.0), 25),
    ) {
        let mut store = BodyStore::new();
        let mut tree = DynamicAabbTree::new();
        let sphere = Arc::new(Shape::sphere(0.5).unwrap_or_else(|e| panic!("{e}")));
        let ids: Vec<BodyId> = starts
            .iter()
            .map(|(x, y, z)| store.insert(Body::new(Vec3::new(*x, *y, *z), 1.0).with_shape(Arc::clone(&sphere))))
            .collect();
        for id in &ids {
            prop_assert!(tree.add_object(&store, *id).is_ok());
        }
        for (id, (dx, dy, dz)) in ids.iter().zip(&offsets) {
            if let Some(body) = store.get_mut(*id) {
                body.set_position(body.position() + Vec3::new(*dx, *dy, *dz));
            }
        }
        tree.update(&store);
        prop_assert!(tree.is_consistent());

        let mut oracle = AllPairs::new();
        for (id, body) in store.iter() {
            oracle.upsert(id, world_aabb(body));
            prop_assert_eq!(tree.leaf_aabb(id), Some(world_aabb(body)));
        }
        prop_assert_eq!(tree.pairs(), oracle.pairs());
    }
}
