// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for the solver and its configuration.

use thiserror::Error;
use xpbd_core::body::BodyId;
use xpbd_core::BodyError;
use xpbd_geom::BroadPhaseError;

/// Errors raised while loading or validating a [`crate::config::SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A tunable is out of range or not finite.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field as it appears in JSON.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Top-level error type for [`crate::system::XpbdSystem`].
#[derive(Debug, Error)]
pub enum SimError {
    /// Body lookup or setup failed.
    #[error(transparent)]
    Body(#[from] BodyError),
    /// Broad-phase registration failed.
    #[error(transparent)]
    BroadPhase(#[from] BroadPhaseError),
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A constraint referenced the same body twice.
    #[error("constraint endpoints must differ: {0}")]
    SelfConstraint(BodyId),
    /// A constraint parameter was negative or not finite.
    #[error("invalid constraint {field}: {value}")]
    InvalidConstraint {
        /// Parameter name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}
