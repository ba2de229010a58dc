// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces, the dynamic AABB tree, and an all-pairs oracle.
//!
//! Determinism contract (applies to all implementations here):
//! - Pair identity is canonicalized as `(min_id, max_id)` by [`BodyId`].
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).

use xpbd_core::body::BodyId;

use crate::types::aabb::Aabb;

#[doc = "Dynamic bounding-volume tree over body AABBs."]
pub mod aabb_tree;
#[doc = "Quadratic reference broad phase used as a correctness oracle."]
pub mod all_pairs;

/// Candidate pair of distinct bodies, stored as `(min_id, max_id)`.
pub type BodyPair = (BodyId, BodyId);

/// Orders two ids into a canonical pair; `None` for a self pair.
pub fn canonical_pair(a: BodyId, b: BodyId) -> Option<BodyPair> {
    match a.cmp(&b) {
        core::cmp::Ordering::Less => Some((a, b)),
        core::cmp::Ordering::Greater => Some((b, a)),
        core::cmp::Ordering::Equal => None,
    }
}

/// Proxy-level broad-phase interface shared by the tree and the all-pairs
/// oracle, so the two can be fed identical boxes and compared.
///
/// Implementations must return pairs deterministically: the pair `(a, b)` is
/// canonicalized such that `a < b`, and the full list is sorted ascending by
/// `(a, b)` with no duplicates.
pub trait BroadPhase {
    /// Inserts or updates the proxy for `id` with `aabb`.
    fn upsert(&mut self, id: BodyId, aabb: Aabb);
    /// Returns a canonical, deterministically-ordered list of overlapping pairs.
    fn pairs(&self) -> Vec<BodyPair>;
}
