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
#![doc = r"Core data for the xpbd rigid-body kernel.

This crate provides:
- Float32 math (`Vec3`, `Quat`, `Mat3`, `Mat4`).
- Read-only mesh geometry and convex collision shapes.
- Rigid bodies, their mass properties, and the `BodyStore` arena.

Design notes:
- Deterministic: no ambient RNG; iteration follows insertion order.
- Float32 throughout; math helpers avoid hidden allocations.
- Behaviour lives in the solver crate; bodies here carry state only.
"]

/// Body state, handles, and the body arena.
pub mod body;
/// Error types for shape and body construction.
pub mod error;
/// Reference inertia tensors.
pub mod mass;
/// Vector, quaternion, and matrix math.
pub mod math;
/// Mesh geometry read by the kernel.
pub mod mesh;
/// Convex collision shapes.
pub mod shape;

pub use body::{Body, BodyId, BodyStore, MotionState};
pub use error::{BodyError, ShapeError};
pub use math::{Mat3, Mat4, Quat, Vec3};
pub use mesh::Mesh;
pub use shape::Shape;
