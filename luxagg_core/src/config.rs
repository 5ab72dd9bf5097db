//! Runtime settings for the cycle and its tick source.
//!
//! These are separate from the TOML-deserialized config in `luxagg_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

/// Largest scaled reading the window accepts; anything above is clamped.
pub const DEFAULT_READING_CEILING: f32 = 150.0;
/// Reference tick period (2 Hz).
pub const DEFAULT_TICK_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingCfg {
    /// One state-machine step per tick.
    pub tick_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl SamplingCfg {
    pub fn period(&self) -> Duration {
        crate::util::tick_period(self.tick_ms)
    }
}

/// Operational range applied to every reading before it enters the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorLimits {
    pub ceiling: f32,
}

impl Default for SensorLimits {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_READING_CEILING,
        }
    }
}
