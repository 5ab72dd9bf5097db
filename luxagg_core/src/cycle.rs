//! The fill → compute → select → report → reset state machine.
//!
//! A `Cycle` advances exactly one step per tick:
//!
//! - `Filling`: read one sample, condition it, append it. The append that
//!   fills the window moves the cycle to `Reducing`.
//! - `Reducing`: compute statistics, pick an aggregation, hand back a
//!   `CycleResult`, reset the window and return to `Filling`.
//!
//! Twelve sampling ticks plus one reporting tick make a full cycle. Sensor
//! failures consume their tick and never stop the machine.

use eyre::WrapErr;
use luxagg_traits::LightSensor;

use crate::aggregation::{Aggregation, Band, Thresholds};
use crate::builder::{CycleBuilder, Missing};
use crate::config::SensorLimits;
use crate::error::{CoreError, Result};
use crate::hw_error::map_sensor_error;
use crate::stats::{SEED_GUESS, SqrtOutcome, Statistics};
use crate::window::{WINDOW_CAPACITY, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Filling,
    Reducing,
}

/// Snapshot of one reduced window.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    /// 1-based count of reduced windows since `begin`.
    pub sequence: u64,
    pub readings: [f32; WINDOW_CAPACITY],
    pub stats: Statistics,
    pub aggregation: Aggregation,
}

impl CycleResult {
    pub fn std_dev(&self) -> f64 {
        self.stats.std_dev
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean
    }

    pub fn band(&self) -> Band {
        self.aggregation.band()
    }

    pub fn reduced(&self) -> &[f64] {
        self.aggregation.values()
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleEvent {
    /// A reading entered the window; `count` is the window length after it.
    Sampled {
        reading: f32,
        count: usize,
        clamped: bool,
    },
    /// The tick produced no reading.
    Rejected(CoreError),
    Reduced(CycleResult),
}

/// Bring a raw reading into `[0, ceiling]`.
///
/// Returns the reading and whether it had to be clamped. Non-finite readings
/// are rejected outright.
pub fn condition_reading(raw: f32, ceiling: f32) -> std::result::Result<(f32, bool), CoreError> {
    if !raw.is_finite() {
        return Err(CoreError::InvalidReading(raw));
    }
    if raw > ceiling {
        Ok((ceiling, true))
    } else if raw < 0.0 {
        Ok((0.0, true))
    } else {
        Ok((raw, false))
    }
}

pub struct Cycle<S> {
    pub(crate) sensor: S,
    pub(crate) window: Window,
    pub(crate) phase: CyclePhase,
    pub(crate) thresholds: Thresholds,
    pub(crate) limits: SensorLimits,
    pub(crate) guess: f64,
    pub(crate) cycles: u64,
    pub(crate) activated: bool,
}

impl<S> core::fmt::Debug for Cycle<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cycle")
            .field("phase", &self.phase)
            .field("len", &self.window.len())
            .field("guess", &self.guess)
            .field("cycles", &self.cycles)
            .field("activated", &self.activated)
            .finish_non_exhaustive()
    }
}

impl Cycle<Missing> {
    pub fn builder() -> CycleBuilder<Missing> {
        CycleBuilder::default()
    }
}

impl<S: LightSensor> Cycle<S> {
    /// Activate the sensor (first call only) and start from an empty window.
    pub fn begin(&mut self) -> Result<()> {
        if !self.activated {
            self.sensor
                .activate()
                .map_err(|e| eyre::Report::new(map_sensor_error(&*e)))
                .wrap_err("activate light sensor")?;
            self.activated = true;
        }
        self.window.reset();
        self.phase = CyclePhase::Filling;
        tracing::info!(
            collapse_max = self.thresholds.collapse_max,
            passthrough_min = self.thresholds.passthrough_min,
            ceiling = self.limits.ceiling,
            "cycle started"
        );
        Ok(())
    }

    /// Advance one tick.
    ///
    /// Sensor trouble comes back as `Ok(CycleEvent::Rejected(..))`. `Err` is
    /// reserved for calling before `begin` and for invariant violations, after
    /// which the caller should `recover`.
    pub fn step(&mut self) -> Result<CycleEvent> {
        if !self.activated {
            return Err(eyre::Report::new(CoreError::NotStarted));
        }
        match self.phase {
            CyclePhase::Filling => self.sample(),
            CyclePhase::Reducing => self.reduce().map(CycleEvent::Reduced),
        }
    }

    fn sample(&mut self) -> Result<CycleEvent> {
        let raw = match self.sensor.read_lux() {
            Ok(v) => v,
            Err(e) => {
                let err = map_sensor_error(&*e);
                tracing::warn!(error = %err, "sensor read failed; tick skipped");
                return Ok(CycleEvent::Rejected(err));
            }
        };
        let (reading, clamped) = match condition_reading(raw, self.limits.ceiling) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(raw, "non-finite reading rejected");
                return Ok(CycleEvent::Rejected(err));
            }
        };
        if clamped {
            tracing::warn!(
                raw,
                reading,
                ceiling = self.limits.ceiling,
                "reading outside operational range; clamped"
            );
        }
        let count = self.window.append(reading).map_err(eyre::Report::new)?;
        tracing::debug!(reading, count, "light sample");
        if self.window.is_full() {
            self.phase = CyclePhase::Reducing;
        }
        Ok(CycleEvent::Sampled {
            reading,
            count,
            clamped,
        })
    }

    fn reduce(&mut self) -> Result<CycleResult> {
        let readings = *self.window.as_full().ok_or_else(|| {
            eyre::Report::new(CoreError::Incomplete {
                len: self.window.len(),
            })
        })?;
        let stats = Statistics::compute_full(&readings, self.window.sum(), self.guess);
        let aggregation =
            Aggregation::select(stats.std_dev, &self.thresholds, &readings, stats.mean);

        // Only a converged estimate seeds the next window.
        self.guess = match stats.sqrt {
            SqrtOutcome::Converged { .. } if stats.std_dev.is_finite() && stats.std_dev > 0.0 => {
                stats.std_dev
            }
            _ => SEED_GUESS,
        };
        self.cycles += 1;
        self.window.reset();
        self.phase = CyclePhase::Filling;

        tracing::info!(
            sequence = self.cycles,
            mean = stats.mean,
            std_dev = stats.std_dev,
            sqrt_iterations = stats.sqrt.iterations(),
            scheme = aggregation.label(),
            "window reduced"
        );
        Ok(CycleResult {
            sequence: self.cycles,
            readings,
            stats,
            aggregation,
        })
    }
}

impl<S> Cycle<S> {
    /// Discard the current window and resume filling.
    pub fn recover(&mut self) {
        tracing::warn!(
            discarded = self.window.len(),
            "window reset after invariant violation"
        );
        self.window.reset();
        self.phase = CyclePhase::Filling;
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn limits(&self) -> &SensorLimits {
        &self.limits
    }

    /// Initial guess the next square-root approximation will start from.
    pub fn guess(&self) -> f64 {
        self.guess
    }

    /// Windows reduced since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_started(&self) -> bool {
        self.activated
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn into_sensor(self) -> S {
        self.sensor
    }
}
