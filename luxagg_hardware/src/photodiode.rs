//! ADC counts to lux for the node's photosynthetic light sensor.
//!
//! The sensor drives a photocurrent through a load resistor; the ADC samples
//! the resulting voltage against its reference:
//!
//! ```text
//! V   = vref * raw / adc_full_scale
//! I   = V / load_ohms
//! lux = lux_per_amp * I
//! ```
//!
//! With the defaults (1.5 V reference, 12-bit ADC, 100 kΩ load and
//! 0.625e6 lux/mA) one count is about 2.29 lux.

use crate::error::{HwError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photodiode {
    /// ADC reference voltage (V).
    pub vref: f32,
    /// Number of ADC codes; valid raw readings are `0..adc_full_scale`.
    pub adc_full_scale: u32,
    /// Load resistor (Ω).
    pub load_ohms: f32,
    /// Datasheet sensitivity (lux per ampere of photocurrent).
    pub lux_per_amp: f32,
}

impl Default for Photodiode {
    fn default() -> Self {
        Self {
            vref: 1.5,
            adc_full_scale: 4096,
            load_ohms: 100_000.0,
            lux_per_amp: 0.625e6 * 1000.0,
        }
    }
}

impl Photodiode {
    pub fn validate(&self) -> Result<()> {
        if !(self.vref.is_finite() && self.vref > 0.0) {
            return Err(HwError::InvalidParams("vref must be > 0"));
        }
        if self.adc_full_scale == 0 {
            return Err(HwError::InvalidParams("adc_full_scale must be > 0"));
        }
        if !(self.load_ohms.is_finite() && self.load_ohms > 0.0) {
            return Err(HwError::InvalidParams("load_ohms must be > 0"));
        }
        if !(self.lux_per_amp.is_finite() && self.lux_per_amp > 0.0) {
            return Err(HwError::InvalidParams("lux_per_amp must be > 0"));
        }
        Ok(())
    }

    /// Convert raw ADC counts to lux.
    pub fn raw_to_lux(&self, raw: u32) -> Result<f32> {
        if raw >= self.adc_full_scale {
            return Err(HwError::AdcOutOfRange {
                raw,
                full_scale: self.adc_full_scale,
            });
        }
        // f64 intermediates: the current is ~1e-5 A and the gain ~1e9.
        let volts = f64::from(self.vref) * f64::from(raw) / f64::from(self.adc_full_scale);
        let amps = volts / f64::from(self.load_ohms);
        Ok((f64::from(self.lux_per_amp) * amps) as f32)
    }

    /// Lux represented by a single ADC count.
    pub fn lux_per_count(&self) -> f32 {
        let volts = f64::from(self.vref) / f64::from(self.adc_full_scale.max(1));
        (f64::from(self.lux_per_amp) * volts / f64::from(self.load_ohms)) as f32
    }
}
