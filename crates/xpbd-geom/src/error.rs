// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for the broad and narrow phases.

use thiserror::Error;
use xpbd_core::body::BodyId;

/// Errors raised by broad-phase registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadPhaseError {
    /// The body handle does not exist in the supplied store.
    #[error("cannot register {0}: no such body")]
    UnknownBody(BodyId),
    /// The body already has a leaf in the tree.
    #[error("{0} is already registered with the broad phase")]
    AlreadyRegistered(BodyId),
}

/// Reasons the expanding-polytope penetration query can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EpaError {
    /// EPA must be seeded with a tetrahedron.
    #[error("EPA needs a 4-point simplex, got {0} points")]
    NonTetrahedralSimplex(usize),
    /// Every candidate face collapsed (zero-area or coplanar input).
    #[error("EPA polytope degenerated to no valid faces")]
    DegeneratePolytope,
    /// The iteration cap was reached before the tolerance was met.
    #[error("EPA did not converge within {iterations} iterations")]
    NoConvergence {
        /// The cap that was exhausted.
        iterations: u32,
    },
}
