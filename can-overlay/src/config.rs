//! Synthesizer configuration types
//!
//! This module defines the configuration a `FrameSynthesizer` is built
//! with. Diagnostic overrides live here too, so test-only values are always
//! injected explicitly and never picked up from the environment.

use crate::frames::Generation;
use crate::sequencer::SequenceState;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Configuration for the frame synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    /// Vehicle generation (selects layouts and footers)
    #[serde(default)]
    pub generation: Generation,

    /// Bus index frames are emitted on (default: 0)
    #[serde(default)]
    pub bus: u8,

    /// Ticks per steering counter increment (default: 1)
    #[serde(default = "default_steer_step")]
    pub steer_step: NonZeroU64,

    /// Which stock alerts are cleared and when
    #[serde(default)]
    pub alert_policy: AlertPolicy,

    /// Test-only overrides for the throttle and brake frames
    #[serde(default)]
    pub diagnostics: DiagnosticOverrides,
}

fn default_steer_step() -> NonZeroU64 {
    NonZeroU64::MIN
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            bus: 0,
            steer_step: default_steer_step(),
            alert_policy: AlertPolicy::default(),
            diagnostics: DiagnosticOverrides::default(),
        }
    }
}

/// Stock alert suppression policy
///
/// Two revisions of the lane-keep alert filter disagree on when the
/// hands-on-wheel warning and the disengage tone are cleared. `Reference`
/// clears them only while assist is active; `Unconditional` clears them on
/// every tick. Lane departure codes are cleared on every tick under both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    #[default]
    Reference,
    Unconditional,
}

/// Diagnostic overrides for the throttle and brake frames
///
/// `None` passes the stock value through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticOverrides {
    #[serde(default)]
    pub throttle_pedal: Option<i64>,
    #[serde(default)]
    pub brake_speed: Option<i64>,
}

impl DiagnosticOverrides {
    pub fn is_empty(&self) -> bool {
        self.throttle_pedal.is_none() && self.brake_speed.is_none()
    }
}

impl SynthesizerConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the vehicle generation
    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    /// Builder method: set the output bus
    pub fn with_bus(mut self, bus: u8) -> Self {
        self.bus = bus;
        self
    }

    /// Builder method: set the steering counter step
    pub fn with_steer_step(mut self, step: NonZeroU64) -> Self {
        self.steer_step = step;
        self
    }

    /// Builder method: set the alert suppression policy
    pub fn with_alert_policy(mut self, policy: AlertPolicy) -> Self {
        self.alert_policy = policy;
        self
    }

    /// Builder method: override the throttle pedal value
    pub fn with_throttle_override(mut self, pedal: i64) -> Self {
        self.diagnostics.throttle_pedal = Some(pedal);
        self
    }

    /// Builder method: override the brake pedal frame's speed value
    pub fn with_brake_speed_override(mut self, speed: i64) -> Self {
        self.diagnostics.brake_speed = Some(speed);
        self
    }

    /// Sequence state for `tick` using the configured step
    pub fn sequence(&self, tick: u64) -> SequenceState {
        SequenceState::new(tick, self.steer_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesizer_config_builder() {
        let config = SynthesizerConfig::new()
            .with_generation(Generation::Legacy)
            .with_bus(2)
            .with_steer_step(NonZeroU64::new(2).unwrap())
            .with_alert_policy(AlertPolicy::Unconditional)
            .with_throttle_override(30);

        assert_eq!(config.generation, Generation::Legacy);
        assert_eq!(config.bus, 2);
        assert_eq!(config.steer_step.get(), 2);
        assert_eq!(config.alert_policy, AlertPolicy::Unconditional);
        assert_eq!(config.diagnostics.throttle_pedal, Some(30));
        assert_eq!(config.diagnostics.brake_speed, None);
        assert_eq!(config.sequence(7).tick, 7);
    }

    #[test]
    fn test_defaults() {
        let config = SynthesizerConfig::new();

        assert_eq!(config.generation, Generation::Integrated);
        assert_eq!(config.steer_step.get(), 1);
        assert_eq!(config.alert_policy, AlertPolicy::Reference);
        assert!(config.diagnostics.is_empty());
    }
}
