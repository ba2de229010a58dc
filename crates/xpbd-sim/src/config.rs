// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulation tunables.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! overrides: `{"damping": 1.0}` is a complete config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use xpbd_core::math::Vec3;
use xpbd_geom::NarrowPhase;

use crate::error::ConfigError;

/// Gravity acceleration vector (m/s²).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];
/// Fixed step (s).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;
/// Per-tick velocity multiplier.
pub const DEFAULT_DAMPING: f32 = 0.8;
/// Restitution between bodies.
pub const DEFAULT_RESTITUTION: f32 = 0.5;
/// Coulomb-style friction coefficient.
pub const DEFAULT_FRICTION: f32 = 0.2;
/// Approach speeds below this are resolved without bounce.
pub const DEFAULT_RESTITUTION_THRESHOLD: f32 = 0.5;
/// GJK iteration cap.
pub const DEFAULT_GJK_MAX_ITERATIONS: u32 = 64;
/// EPA iteration cap.
pub const DEFAULT_EPA_MAX_ITERATIONS: u32 = 256;
/// EPA convergence tolerance.
pub const DEFAULT_EPA_TOLERANCE: f32 = 1e-5;
/// Linear speed under which a contacting body comes to rest.
pub const DEFAULT_REST_SPEED: f32 = 0.05;
/// Linear speed a resting body must exceed to wake.
pub const DEFAULT_WAKE_SPEED: f32 = 2.0 * DEFAULT_REST_SPEED;
/// Passes over the contact set per tick.
pub const DEFAULT_CONTACT_ITERATIONS: u32 = 4;
/// Relaxation passes over distance constraints per tick.
pub const DEFAULT_CONSTRAINT_ITERATIONS: u32 = 4;
/// Ground height used by [`GroundPlane::default`].
pub const DEFAULT_GROUND_HEIGHT: f32 = -0.1;
/// Ground bounce used by [`GroundPlane::default`].
pub const DEFAULT_GROUND_RESTITUTION: f32 = 0.6;

/// How the contact point between two bodies is chosen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPointModel {
    /// Midpoint of the two body origins.
    #[default]
    CenterMidpoint,
    /// Midpoint of the EPA witness points; falls back to the centre midpoint
    /// for contacts without witnesses.
    EpaWitness,
}

/// Infinite plane `normal · x = height` that pushes bodies towards `normal`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundPlane {
    /// Signed offset along `normal`.
    pub height: f32,
    /// Outward normal; normalised on use.
    pub normal: [f32; 3],
    /// Bounce against the plane.
    pub restitution: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            height: DEFAULT_GROUND_HEIGHT,
            normal: [0.0, 1.0, 0.0],
            restitution: DEFAULT_GROUND_RESTITUTION,
        }
    }
}

impl GroundPlane {
    /// Unit outward normal.
    pub fn normal_vec(&self) -> Vec3 {
        let [x, y, z] = self.normal;
        Vec3::new(x, y, z).normalize_or(Vec3::UNIT_Y)
    }
}

/// Solver tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Gravity acceleration vector.
    pub gravity: [f32; 3],
    /// Fixed step in seconds.
    pub time_step: f32,
    /// Velocity multiplier applied once per tick, in `[0, 1]`.
    pub damping: f32,
    /// Restitution between bodies, in `[0, 1]`.
    pub restitution: f32,
    /// Friction coefficient, `≥ 0`.
    pub friction: f32,
    /// Normal approach speed below which restitution is ignored.
    pub restitution_threshold: f32,
    /// GJK iteration cap.
    pub gjk_max_iterations: u32,
    /// EPA iteration cap.
    pub epa_max_iterations: u32,
    /// EPA convergence tolerance.
    pub epa_tolerance: f32,
    /// Rest threshold on linear speed.
    pub rest_speed: f32,
    /// Wake threshold on linear speed; must not be below `rest_speed`.
    pub wake_speed: f32,
    /// Push penetrating bodies apart after the impulse.
    pub positional_correction: bool,
    /// Contact point choice for body pairs.
    pub contact_point: ContactPointModel,
    /// Optional world ground plane.
    pub ground: Option<GroundPlane>,
    /// Passes over body pairs and the ground plane. Later passes let a
    /// stack hand its support upwards within one tick.
    pub contact_iterations: u32,
    /// Relaxation passes over distance constraints.
    pub constraint_iterations: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            time_step: DEFAULT_TIME_STEP,
            damping: DEFAULT_DAMPING,
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            restitution_threshold: DEFAULT_RESTITUTION_THRESHOLD,
            gjk_max_iterations: DEFAULT_GJK_MAX_ITERATIONS,
            epa_max_iterations: DEFAULT_EPA_MAX_ITERATIONS,
            epa_tolerance: DEFAULT_EPA_TOLERANCE,
            rest_speed: DEFAULT_REST_SPEED,
            wake_speed: DEFAULT_WAKE_SPEED,
            positional_correction: true,
            contact_point: ContactPointModel::default(),
            ground: None,
            contact_iterations: DEFAULT_CONTACT_ITERATIONS,
            constraint_iterations: DEFAULT_CONSTRAINT_ITERATIONS,
        }
    }
}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

impl SimConfig {
    /// Gravity as a vector.
    pub fn gravity_vec(&self) -> Vec3 {
        let [x, y, z] = self.gravity;
        Vec3::new(x, y, z)
    }

    /// Narrow phase configured with this config's caps and tolerance.
    pub fn narrow_phase(&self) -> NarrowPhase {
        NarrowPhase::new(
            self.gjk_max_iterations,
            self.epa_max_iterations,
            self.epa_tolerance,
        )
    }

    /// Rejects non-finite or out-of-range tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(
            self.gravity.into_iter().all(f32::is_finite),
            "gravity",
            "must be finite",
        )?;
        check(
            self.time_step.is_finite() && self.time_step > 0.0,
            "time_step",
            "must be positive",
        )?;
        check(
            (0.0..=1.0).contains(&self.damping),
            "damping",
            "must be within [0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.restitution),
            "restitution",
            "must be within [0, 1]",
        )?;
        check(
            self.friction.is_finite() && self.friction >= 0.0,
            "friction",
            "must be non-negative",
        )?;
        check(
            self.restitution_threshold.is_finite() && self.restitution_threshold >= 0.0,
            "restitution_threshold",
            "must be non-negative",
        )?;
        check(
            self.epa_tolerance.is_finite() && self.epa_tolerance > 0.0,
            "epa_tolerance",
            "must be positive",
        )?;
        check(
            self.contact_iterations > 0,
            "contact_iterations",
            "must be at least 1",
        )?;
        check(
            self.rest_speed.is_finite() && self.rest_speed >= 0.0,
            "rest_speed",
            "must be non-negative",
        )?;
        check(
            self.wake_speed.is_finite() && self.wake_speed >= self.rest_speed,
            "wake_speed",
            "must be at least rest_speed",
        )?;
        if let Some(ground) = &self.ground {
            check(ground.height.is_finite(), "ground.height", "must be finite")?;
            let [x, y, z] = ground.normal;
            check(
                Vec3::new(x, y, z).length() > xpbd_core::math::EPSILON,
                "ground.normal",
                "must be non-zero",
            )?;
            check(
                (0.0..=1.0).contains(&ground.restitution),
                "ground.restitution",
                "must be within [0, 1]",
            )?;
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Parses and validates JSON bytes. Empty input yields the defaults.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
        assert_eq!(SimConfig::default().wake_speed, 0.1);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = SimConfig::from_json_str(r#"{"damping": 1.0, "contact_point": "epa_witness"}"#)
            .unwrap();
        assert_eq!(cfg.damping, 1.0);
        assert_eq!(cfg.contact_point, ContactPointModel::EpaWitness);
        assert_eq!(cfg.time_step, DEFAULT_TIME_STEP);
        assert!(cfg.ground.is_none());
    }

    #[test]
    fn ground_object_fills_missing_fields() {
        let cfg = SimConfig::from_json_str(r#"{"ground": {"height": 0.0}}"#).unwrap();
        let ground = cfg.ground.unwrap();
        assert_eq!(ground.height, 0.0);
        assert_eq!(ground.restitution, DEFAULT_GROUND_RESTITUTION);
        assert_eq!(ground.normal_vec(), Vec3::UNIT_Y);
    }

    #[test]
    fn empty_input_is_default() {
        assert_eq!(SimConfig::from_json_str("  \n").unwrap(), SimConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = SimConfig::from_json_str(r#"{"time_step": 0.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "time_step",
                ..
            }
        ));
        let err = SimConfig::from_json_str(r#"{"rest_speed": 0.5, "wake_speed": 0.2}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "wake_speed",
                ..
            }
        ));
        let err = SimConfig::from_json_str(r#"{"contact_iterations": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "contact_iterations",
                ..
            }
        ));
        assert!(matches!(
            SimConfig::from_json_str("{not json"),
            Err(ConfigError::Serde(_))
        ));
    }

    #[test]
    fn pretty_json_parses_back() {
        let mut cfg = SimConfig::default();
        cfg.ground = Some(GroundPlane::default());
        let text = cfg.to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json_str(&text).unwrap(), cfg);
    }
}
