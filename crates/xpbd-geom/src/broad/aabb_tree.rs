// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};
use xpbd_core::body::{Body, BodyId, BodyStore};

use super::{canonical_pair, BodyPair, BroadPhase};
use crate::bounds::world_aabb;
use crate::error::BroadPhaseError;
use crate::types::aabb::Aabb;

/// Index of a node inside the tree arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Leaf or internal node payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf bounding exactly one body.
    Leaf(BodyId),
    /// Internal node with exactly two children.
    Internal {
        /// First child.
        left: NodeId,
        /// Second child.
        right: NodeId,
    },
}

/// Node of the bounding-volume tree.
///
/// For internal nodes `aabb` equals the union of both children once the tree
/// has been refit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AabbNode {
    aabb: Aabb,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl AabbNode {
    /// Bounding box of this subtree.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Leaf or internal payload.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// Dynamic binary AABB tree.
///
/// Insertion follows the child a depth-first stack would visit first (the
/// right child) down to a leaf and splits that leaf. There is no
/// surface-area heuristic and no rebalancing, so the tree can degrade to a
/// spine; all traversals are iterative.
///
/// Nodes live in an append-only arena. Leaves are never removed one at a
/// time; [`DynamicAabbTree::clear`] tears the whole tree down.
#[derive(Debug, Default, Clone)]
pub struct DynamicAabbTree {
    nodes: Vec<AabbNode>,
    root: Option<NodeId>,
    leaves: BTreeMap<BodyId, NodeId>,
}

impl DynamicAabbTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// `true` when no body is registered.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// `true` if `id` has a leaf in the tree.
    pub fn contains(&self, id: BodyId) -> bool {
        self.leaves.contains_key(&id)
    }

    /// Root node handle.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Looks up a live node.
    pub fn node(&self, id: NodeId) -> Option<&AabbNode> {
        self.nodes.get(id.index())
    }

    /// Current leaf box of a registered body.
    pub fn leaf_aabb(&self, id: BodyId) -> Option<Aabb> {
        self.leaves.get(&id).map(|leaf| self.at(*leaf).aabb)
    }

    /// World AABB the tree would assign to `body` right now.
    pub fn compute_aabb(body: &Body) -> Aabb {
        world_aabb(body)
    }

    /// Registers a body from `store`, computing its AABB from the current
    /// pose and geometry.
    ///
    /// Unknown or already-registered bodies are rejected with a warning and
    /// leave the tree untouched.
    pub fn add_object(&mut self, store: &BodyStore, id: BodyId) -> Result<(), BroadPhaseError> {
        let Some(body) = store.get(id) else {
            warn!(body = %id, "broad phase rejected unknown body");
            return Err(BroadPhaseError::UnknownBody(id));
        };
        if self.contains(id) {
            warn!(body = %id, "broad phase rejected duplicate registration");
            return Err(BroadPhaseError::AlreadyRegistered(id));
        }
        self.insert(id, world_aabb(body));
        Ok(())
    }

    /// Tears the tree down, dropping every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaves.clear();
        self.root = None;
    }

    /// Recomputes every leaf box from its body's pose and geometry and refits
    /// internal boxes bottom-up in a single post-order pass.
    ///
    /// Leaves whose body is missing from `store` keep their previous box.
    pub fn update(&mut self, store: &BodyStore) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![(root, false)];
        while let Some((id, children_done)) = stack.pop() {
            match self.at(id).kind {
                NodeKind::Leaf(body) => {
                    if let Some(body) = store.get(body) {
                        self.at_mut(id).aabb = world_aabb(body);
                    }
                }
                NodeKind::Internal { left, right } => {
                    if children_done {
                        self.at_mut(id).aabb = self.at(left).aabb.union(&self.at(right).aabb);
                    } else {
                        stack.push((id, true));
                        stack.push((right, false));
                        stack.push((left, false));
                    }
                }
            }
        }
    }

    /// Self-intersects the tree and writes every overlapping leaf pair with
    /// distinct bodies into `out` (cleared first), canonical, sorted, and
    /// deduplicated.
    pub fn collect_collision_pairs(&self, out: &mut Vec<BodyPair>) {
        out.clear();
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![(root, root)];
        while let Some((a, b)) = stack.pop() {
            let (na, nb) = (self.at(a), self.at(b));
            if !na.aabb.overlaps(&nb.aabb) {
                continue;
            }
            match (na.kind, nb.kind) {
                (NodeKind::Leaf(x), NodeKind::Leaf(y)) => {
                    if let Some(pair) = canonical_pair(x, y) {
                        out.push(pair);
                    }
                }
                (NodeKind::Leaf(_), NodeKind::Internal { left, right }) => {
                    stack.push((a, left));
                    stack.push((a, right));
                }
                (NodeKind::Internal { left, right }, NodeKind::Leaf(_)) => {
                    stack.push((left, b));
                    stack.push((right, b));
                }
                (NodeKind::Internal { left: al, right: ar }, NodeKind::Internal { left: bl, right: br }) => {
                    if a == b {
                        // Self test: (r, l) mirrors (l, r).
                        stack.push((al, al));
                        stack.push((al, ar));
                        stack.push((ar, ar));
                    } else {
                        stack.push((al, bl));
                        stack.push((al, br));
                        stack.push((ar, bl));
                        stack.push((ar, br));
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        debug!(pairs = out.len(), "broad phase candidate pairs");
        for (first, second) in &*out {
            trace!(first = %first, second = %second, "candidate pair");
        }
    }

    /// Returns `true` when every internal box equals the union of its
    /// children and every child points back at its parent.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return self.leaves.is_empty();
        };
        if self.at(root).parent.is_some() {
            return false;
        }
        let mut leaf_count = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match self.at(id).kind {
                NodeKind::Leaf(body) => {
                    leaf_count += 1;
                    if self.leaves.get(&body) != Some(&id) {
                        return false;
                    }
                }
                NodeKind::Internal { left, right } => {
                    let expected = self.at(left).aabb.union(&self.at(right).aabb);
                    if self.at(id).aabb != expected
                        || self.at(left).parent != Some(id)
                        || self.at(right).parent != Some(id)
                    {
                        return false;
                    }
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        leaf_count == self.leaves.len()
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Internal { left, right } = self.at(id).kind {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    fn at(&self, id: NodeId) -> &AabbNode {
        &self.nodes[id.index()]
    }

    fn at_mut(&mut self, id: NodeId) -> &mut AabbNode {
        &mut self.nodes[id.index()]
    }

    fn alloc(&mut self, node: AabbNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn insert(&mut self, body: BodyId, aabb: Aabb) {
        let leaf = self.alloc(AabbNode {
            aabb,
            parent: None,
            kind: NodeKind::Leaf(body),
        });
        self.leaves.insert(body, leaf);
        trace!(body = %body, "broad phase insert");

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return;
        };
        let mut sibling = root;
        while let NodeKind::Internal { right, .. } = self.at(sibling).kind {
            sibling = right;
        }
        let old_parent = self.at(sibling).parent;
        let merged = self.at(sibling).aabb.union(&aabb);
        let parent = self.alloc(AabbNode {
            aabb: merged,
            parent: old_parent,
            kind: NodeKind::Internal {
                left: sibling,
                right: leaf,
            },
        });
        self.at_mut(sibling).parent = Some(parent);
        self.at_mut(leaf).parent = Some(parent);
        match old_parent {
            None => self.root = Some(parent),
            Some(grand) => {
                self.replace_child(grand, sibling, parent);
                self.refit_from(grand);
            }
        }
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Internal { left, right } = &mut self.at_mut(parent).kind {
            if *left == old {
                *left = new;
            } else if *right == old {
                *right = new;
            }
        }
    }

    /// Walks from `start` to the root recomputing each box as the union of
    /// its children.
    fn refit_from(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            if let NodeKind::Internal { left, right } = self.at(id).kind {
                self.at_mut(id).aabb = self.at(left).aabb.union(&self.at(right).aabb);
            }
            current = self.at(id).parent;
        }
    }
}

impl BroadPhase for DynamicAabbTree {
    fn upsert(&mut self, id: BodyId, aabb: Aabb) {
        if let Some(&leaf) = self.leaves.get(&id) {
            self.at_mut(leaf).aabb = aabb;
            if let Some(parent) = self.at(leaf).parent {
                self.refit_from(parent);
            }
        } else {
            self.insert(id, aabb);
        }
    }

    fn pairs(&self) -> Vec<BodyPair> {
        let mut out = Vec::new();
        self.collect_collision_pairs(&mut out);
        out
    }
}
