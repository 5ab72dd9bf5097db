//! Tick period helpers.

use std::time::Duration;

use crate::window::WINDOW_CAPACITY;

/// Ticks per full cycle: one per reading plus the reporting tick.
pub const TICKS_PER_CYCLE: u64 = WINDOW_CAPACITY as u64 + 1;

/// Tick period for `tick_ms`, clamped to at least 1 ms.
#[inline]
pub fn tick_period(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(1))
}

/// Wall time of one full cycle at `tick_ms`.
#[inline]
pub fn cycle_duration(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(1).saturating_mul(TICKS_PER_CYCLE))
}
