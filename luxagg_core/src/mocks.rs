//! Test and helper mocks for luxagg_core

use std::collections::VecDeque;

use luxagg_traits::{LightSensor, TickSource};

use crate::cycle::CycleResult;
use crate::error::Result;
use crate::report::Reporter;

/// A sensor that plays back a script of readings.
///
/// `None` entries fail the read with a "scripted sensor fault" error. Once
/// the script runs out the sensor either starts over (`repeating`) or reports
/// exhaustion (`once`).
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    script: Vec<Option<f32>>,
    pos: usize,
    repeat: bool,
    activations: u32,
    fail_activation: bool,
}

impl ScriptedSensor {
    /// The same reading forever.
    pub fn repeating(value: f32) -> Self {
        Self::cycle_through(vec![value])
    }

    /// Loop over `values` forever.
    pub fn cycle_through(values: Vec<f32>) -> Self {
        Self::with_failures(values.into_iter().map(Some).collect(), true)
    }

    /// Yield `values` once, then report the source exhausted.
    pub fn once(values: Vec<f32>) -> Self {
        Self::with_failures(values.into_iter().map(Some).collect(), false)
    }

    pub fn with_failures(script: Vec<Option<f32>>, repeat: bool) -> Self {
        Self {
            script,
            pos: 0,
            repeat,
            activations: 0,
            fail_activation: false,
        }
    }

    /// Make `activate` fail.
    pub fn failing_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Reads served so far (successful or not).
    pub fn reads(&self) -> usize {
        self.pos
    }
}

impl LightSensor for ScriptedSensor {
    fn activate(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_activation {
            return Err(Box::new(std::io::Error::other("scripted activation failure")));
        }
        self.activations += 1;
        Ok(())
    }

    fn read_lux(&mut self) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        if self.script.is_empty() || (!self.repeat && self.pos >= self.script.len()) {
            return Err(Box::new(crate::error::CoreError::SourceExhausted));
        }
        let entry = self.script[self.pos % self.script.len()];
        self.pos += 1;
        entry.ok_or_else(|| std::io::Error::other("scripted sensor fault").into())
    }
}

/// Exactly `n` ticks, then closed.
#[derive(Debug, Clone)]
pub struct FixedTicks {
    remaining: u64,
    next: u64,
}

impl FixedTicks {
    pub fn new(n: u64) -> Self {
        Self {
            remaining: n,
            next: 0,
        }
    }
}

impl TickSource for FixedTicks {
    fn next_tick(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.next += 1;
        Some(self.next)
    }
}

/// Keeps every sample and result it is given.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub samples: Vec<(f32, usize)>,
    pub results: VecDeque<CycleResult>,
}

impl Reporter for CollectingReporter {
    fn sample(&mut self, reading: f32, count: usize) -> Result<()> {
        self.samples.push((reading, count));
        Ok(())
    }

    fn emit(&mut self, result: &CycleResult) -> Result<()> {
        self.results.push_back(result.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn emit(&mut self, _result: &CycleResult) -> Result<()> {
        Ok(())
    }
}
