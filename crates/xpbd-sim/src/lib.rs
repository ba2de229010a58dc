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
#![doc = r"Solver for the xpbd rigid-body kernel.

This crate provides:
- `SimConfig`: every tunable, loadable from JSON.
- `XpbdSystem`: owns the bodies and runs one fixed-step tick at a time.
- Impulse contact resolution with restitution and friction, a half-space
  contact path for immovable bodies, and an optional world ground plane.
- An `Active`/`Resting` motion state machine with hysteresis.
- XPBD distance constraints.

Design notes:
- Single-threaded and synchronous; `step` completes before returning.
- Deterministic: bodies and pairs are visited in handle order.
- Failures degrade to no effect for the affected pair; nothing aborts a tick.
"]

/// Simulation tunables and JSON loading.
pub mod config;
/// XPBD distance constraints.
pub mod constraint;
/// Impulse resolution between two bodies.
pub mod contact;
/// Solver and configuration errors.
pub mod error;
/// Contact against an immovable half-space.
pub mod half_space;
/// Per-tick summaries and body snapshots.
pub mod report;
/// Rest/wake transitions.
pub mod rest;
/// The per-tick pipeline.
pub mod system;

pub use config::{ContactPointModel, GroundPlane, SimConfig};
pub use constraint::DistanceConstraint;
pub use error::{ConfigError, SimError};
pub use report::{BodySnapshot, TickReport};
pub use system::XpbdSystem;
