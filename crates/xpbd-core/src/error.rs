// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for body and shape construction.

use thiserror::Error;

use crate::body::BodyId;

/// Errors raised when constructing a [`crate::shape::Shape`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    /// Sphere radius was negative or not finite.
    #[error("invalid sphere radius: {0}")]
    InvalidRadius(f32),
    /// A convex hull needs at least one vertex to have a support point.
    #[error("convex hull has no vertices")]
    EmptyHull,
    /// A hull face referenced a vertex that does not exist.
    #[error("face {face} references vertex {index} but the hull has {len} vertices")]
    FaceIndexOutOfRange {
        /// Position of the offending face in the face list.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the hull.
        len: usize,
    },
    /// A vertex component was NaN or infinite.
    #[error("non-finite vertex at index {0}")]
    NonFiniteVertex(usize),
}

/// Errors raised by [`crate::body::BodyStore`] lookups and body setup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    /// The handle does not refer to a body in this store.
    #[error("unknown body: {0}")]
    UnknownBody(BodyId),
    /// Mass was negative or not finite.
    #[error("invalid mass: {0}")]
    InvalidMass(f32),
}
