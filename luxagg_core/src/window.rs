//! Fixed-capacity reading buffer with a running sum.
//!
//! Strict fill-then-drain: readings are appended until the window holds
//! `WINDOW_CAPACITY` values, the owner reduces it, then `reset` empties it.
//! There is no eviction.

use crate::error::CoreError;

/// Number of readings per aggregation window.
pub const WINDOW_CAPACITY: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    readings: [f32; WINDOW_CAPACITY],
    count: usize,
    // f64 so the running sum has no f32 cancellation error
    sum: f64,
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    pub const fn new() -> Self {
        Self {
            readings: [0.0; WINDOW_CAPACITY],
            count: 0,
            sum: 0.0,
        }
    }

    /// Store `reading` and return the new count.
    pub fn append(&mut self, reading: f32) -> Result<usize, CoreError> {
        if self.count == WINDOW_CAPACITY {
            return Err(CoreError::CapacityExceeded {
                capacity: WINDOW_CAPACITY,
            });
        }
        self.readings[self.count] = reading;
        self.count += 1;
        self.sum += f64::from(reading);
        Ok(self.count)
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.sum = 0.0;
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == WINDOW_CAPACITY
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        WINDOW_CAPACITY
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// The filled prefix, oldest first.
    pub fn readings(&self) -> &[f32] {
        &self.readings[..self.count]
    }

    /// All readings, only once the window is full.
    pub fn as_full(&self) -> Option<&[f32; WINDOW_CAPACITY]> {
        self.is_full().then_some(&self.readings)
    }
}
