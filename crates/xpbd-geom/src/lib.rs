// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![deny(
    clippy::all,
    clippy::pedantic,
    rust_2018_idioms,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![doc = r"Geometry for the xpbd rigid-body kernel.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) and rigid poses (`Pose`).
- World bounds of a body from its shape or mesh.
- A broad-phase trait, a dynamic AABB tree, and an all-pairs oracle.
- A GJK + EPA narrow phase over support mappings.

Design notes:
- Deterministic: pair outputs are canonical and sorted; maps are ordered.
- Float32 throughout; every normalisation is epsilon-guarded.
- Traversals are iterative; the tree may be deep.
"]

/// Broad-phase trait and implementations.
pub mod broad;
/// World-space bounds of bodies.
pub mod bounds;
/// Broad- and narrow-phase errors.
pub mod error;
/// GJK, EPA, and the combined narrow phase.
pub mod narrow;
/// Foundational geometric types.
pub mod types;

pub use broad::aabb_tree::DynamicAabbTree;
pub use broad::all_pairs::AllPairs;
pub use broad::{BodyPair, BroadPhase};
pub use error::{BroadPhaseError, EpaError};
pub use narrow::{Contact, ContactSource, NarrowPhase};
pub use types::aabb::Aabb;
pub use types::pose::Pose;
