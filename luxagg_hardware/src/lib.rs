//! Light sensor backends for the aggregation node.
//!
//! - `SimulatedLightSensor`: deterministic ADC stream through the photodiode model
//! - `ReplayLightSensor`: replays recorded, already-scaled readings
pub mod error;
pub mod photodiode;

pub use error::HwError;
pub use photodiode::Photodiode;

use luxagg_traits::LightSensor;

/// Readings are divided by this before they reach the aggregation core.
pub const DEFAULT_SCALE_DIVISOR: f32 = 10.0;

/// Shape of the simulated ADC stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Resting ADC level.
    pub base_raw: u32,
    /// Uniform noise amplitude (counts) applied around `base_raw`.
    pub jitter_raw: u32,
    /// PRNG seed; 0 is mapped to 1.
    pub seed: u32,
    /// Every n-th read adds `burst_raw` on top of the base level (0 disables).
    pub burst_every: u32,
    /// Extra counts added on burst reads.
    pub burst_raw: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            base_raw: 40,
            jitter_raw: 8,
            seed: 0x1234_5678,
            burst_every: 0,
            burst_raw: 400,
        }
    }
}

/// Simulated photodiode: produces ADC counts and converts them like the real driver.
pub struct SimulatedLightSensor {
    params: SimParams,
    photodiode: Photodiode,
    scale_divisor: f32,
    state: u32,
    reads: u64,
    active: bool,
}

impl SimulatedLightSensor {
    pub fn new(params: SimParams, photodiode: Photodiode, scale_divisor: f32) -> Self {
        Self {
            params,
            photodiode,
            scale_divisor,
            state: params.seed.max(1),
            reads: 0,
            active: false,
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next simulated ADC sample, clamped to the converter's range.
    fn next_raw(&mut self) -> u32 {
        self.reads = self.reads.saturating_add(1);
        let jitter = i64::from(self.params.jitter_raw);
        let noise = if jitter > 0 {
            let span = (2 * jitter + 1) as u64;
            (u64::from(self.next_u32()) % span) as i64 - jitter
        } else {
            0
        };
        let burst = if self.params.burst_every > 0
            && self.reads % u64::from(self.params.burst_every) == 0
        {
            i64::from(self.params.burst_raw)
        } else {
            0
        };
        let top = i64::from(self.photodiode.adc_full_scale.saturating_sub(1));
        (i64::from(self.params.base_raw) + noise + burst).clamp(0, top) as u32
    }
}

impl LightSensor for SimulatedLightSensor {
    fn activate(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.photodiode.validate()?;
        if !(self.scale_divisor.is_finite() && self.scale_divisor > 0.0) {
            return Err(Box::new(HwError::InvalidParams("scale_divisor must be > 0")));
        }
        self.active = true;
        tracing::debug!(
            base_raw = self.params.base_raw,
            jitter_raw = self.params.jitter_raw,
            burst_every = self.params.burst_every,
            "simulated light sensor activated"
        );
        Ok(())
    }

    fn read_lux(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        if !self.active {
            return Err(Box::new(HwError::NotActivated));
        }
        let raw = self.next_raw();
        let lux = self.photodiode.raw_to_lux(raw)?;
        tracing::trace!(raw, lux, "simulated light sample");
        Ok(lux / self.scale_divisor)
    }
}

/// Replays a recorded sequence of scaled readings, then reports exhaustion.
pub struct ReplayLightSensor {
    readings: Vec<f32>,
    next: usize,
}

impl ReplayLightSensor {
    pub fn new(readings: Vec<f32>) -> Self {
        Self { readings, next: 0 }
    }

    /// Readings not yet handed out.
    pub fn remaining(&self) -> usize {
        self.readings.len().saturating_sub(self.next)
    }
}

impl LightSensor for ReplayLightSensor {
    fn read_lux(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        match self.readings.get(self.next) {
            Some(v) => {
                self.next += 1;
                Ok(*v)
            }
            None => Err(Box::new(HwError::Exhausted(self.readings.len()))),
        }
    }
}
