// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use xpbd_core::body::BodyId;

use super::{BodyPair, BroadPhase};
use crate::types::aabb::Aabb;

/// A minimal broad phase using an `O(n^2)` all-pairs sweep.
///
/// Kept as a correctness and determinism baseline for the tree: the two must
/// report identical pair lists for identical proxies.
#[derive(Debug, Default, Clone)]
pub struct AllPairs {
    items: BTreeMap<BodyId, Aabb>,
}

impl AllPairs {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of proxies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no proxies are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl BroadPhase for AllPairs {
    fn upsert(&mut self, id: BodyId, aabb: Aabb) {
        self.items.insert(id, aabb);
    }

    fn pairs(&self) -> Vec<BodyPair> {
        // BTreeMap iteration is sorted by key, so (a, b) is canonical and the
        // nested loop already emits pairs in lexicographic order.
        let items: Vec<(BodyId, Aabb)> = self.items.iter().map(|(id, aabb)| (*id, *aabb)).collect();
        let mut out = Vec::new();
        for (i, (a_id, a_bb)) in items.iter().enumerate() {
            for (b_id, b_bb) in items.iter().skip(i + 1) {
                if a_bb.overlaps(b_bb) {
                    out.push((*a_id, *b_id));
                }
            }
        }
        out
    }
}
