//! Type-state builder for `Cycle`.
//!
//! `build()` only exists once a sensor has been supplied; thresholds and
//! limits fall back to the reference values (20 / 40, ceiling 150).

use luxagg_traits::LightSensor;

use crate::aggregation::Thresholds;
use crate::config::SensorLimits;
use crate::cycle::{Cycle, CyclePhase};
use crate::error::{BuildError, Result};
use crate::stats::SEED_GUESS;
use crate::window::Window;

/// Marker for a builder that has no sensor yet.
#[derive(Debug, Default)]
pub struct Missing;

#[derive(Debug)]
pub struct CycleBuilder<S> {
    sensor: Option<S>,
    thresholds: Option<Thresholds>,
    limits: Option<SensorLimits>,
}

impl Default for CycleBuilder<Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            thresholds: None,
            limits: None,
        }
    }
}

impl CycleBuilder<Missing> {
    pub fn with_sensor<S: LightSensor>(self, sensor: S) -> CycleBuilder<S> {
        CycleBuilder {
            sensor: Some(sensor),
            thresholds: self.thresholds,
            limits: self.limits,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<S> CycleBuilder<S> {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_limits(mut self, limits: SensorLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_ceiling(mut self, ceiling: f32) -> Self {
        self.limits = Some(SensorLimits { ceiling });
        self
    }
}

impl<S: LightSensor> CycleBuilder<S> {
    /// Validate settings and construct an unstarted `Cycle`.
    pub fn build(self) -> Result<Cycle<S>> {
        let thresholds = self.thresholds.unwrap_or_default();
        thresholds.validate().map_err(eyre::Report::new)?;

        let limits = self.limits.unwrap_or_default();
        if !(limits.ceiling.is_finite() && limits.ceiling > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "ceiling must be > 0",
            )));
        }

        let sensor = self
            .sensor
            .ok_or_else(|| eyre::eyre!("cycle builder has no sensor"))?;

        Ok(Cycle {
            sensor,
            window: Window::new(),
            phase: CyclePhase::Filling,
            thresholds,
            limits,
            guess: SEED_GUESS,
            cycles: 0,
            activated: false,
        })
    }
}
