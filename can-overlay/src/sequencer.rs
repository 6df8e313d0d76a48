//! Rolling counter derivation
//!
//! The counter advances once every `step` ticks, so the tick count is
//! divided by the step before the modulus is applied.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Counter wrap point, fixed per frame family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterWidth {
    /// 4-bit counter (integrated steering command)
    Mod16,
    /// 3-bit counter (legacy steering command)
    Mod8,
}

impl CounterWidth {
    pub fn modulus(&self) -> u64 {
        match self {
            CounterWidth::Mod16 => 16,
            CounterWidth::Mod8 => 8,
        }
    }
}

/// Compute `(tick / step) mod modulus`
pub fn next_counter(tick: u64, step: NonZeroU64, width: CounterWidth) -> u64 {
    (tick / step.get()) % width.modulus()
}

/// Process-wide tick count plus the configured counter step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
    pub tick: u64,
    pub step: NonZeroU64,
}

impl SequenceState {
    pub fn new(tick: u64, step: NonZeroU64) -> Self {
        Self { tick, step }
    }

    /// Counter value for this tick
    pub fn counter(&self, width: CounterWidth) -> u64 {
        next_counter(self.tick, self.step, width)
    }
}
