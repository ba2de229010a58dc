// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the kernel (pose, AABB).
//!
//! Overlap semantics are inclusive on faces. Affine math uses `f32` without
//! fused multiply-add so identical inputs give identical bounds.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Rigid poses without scale."]
pub mod pose;
