#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and replay-data parsing for the aggregation node.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; missing values fall back to the node's
//!   reference settings (2 Hz ticks, /10 scaling, 20/40 thresholds).
//! - The replay CSV loader enforces a single `lux` header and rejects
//!   non-finite readings.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Replay CSV schema.
///
/// Expected header:
/// lux
///
/// Example:
/// lux
/// 10.25
/// 11.0
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ReplayRow {
    pub lux: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Tick period in milliseconds; one state-machine step per tick.
    pub tick_ms: u64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self { tick_ms: 500 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    #[default]
    Sim,
    Replay,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    pub base_raw: u32,
    pub jitter_raw: u32,
    pub seed: u32,
    /// Every n-th read is a burst (0 disables)
    pub burst_every: u32,
    pub burst_raw: u32,
}

impl Default for SimCfg {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// Backend: "sim" or "replay"
    pub kind: SensorKind,
    /// Readings are divided by this before entering the window
    pub scale_divisor: f32,
    /// Largest reading accepted by the window; larger values are clamped
    pub ceiling: f32,
    /// Recorded readings for `kind = "replay"`
    pub replay_csv: Option<PathBuf>,
    pub sim: SimCfg,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            kind: SensorKind::Sim,
            scale_divisor: 10.0,
            ceiling: 150.0,
            replay_csv: None,
            sim: SimCfg::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhotodiodeCfg {
    pub vref: f32,
    pub adc_full_scale: u32,
    pub load_ohms: f32,
    pub lux_per_amp: f32,
}

impl Default for PhotodiodeCfg {
    fn default() -> Self {
        Self {
            vref: 1.5,
            adc_full_scale: 4096,
            load_ohms: 100_000.0,
            lux_per_amp: 6.25e8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AggregationCfg {
    /// std_dev at or below this collapses the window to one value
    pub collapse_max_std_dev: f64,
    /// std_dev at or above this passes the window through unreduced
    pub passthrough_min_std_dev: f64,
}

impl Default for AggregationCfg {
    fn default() -> Self {
        Self {
            collapse_max_std_dev: 20.0,
            passthrough_min_std_dev: 40.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ReportCfg {
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sampling: Sampling,
    pub sensor: SensorCfg,
    pub photodiode: PhotodiodeCfg,
    pub aggregation: AggregationCfg,
    pub logging: Logging,
    pub report: ReportCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sampling
        if self.sampling.tick_ms == 0 {
            eyre::bail!("sampling.tick_ms must be >= 1");
        }
        if self.sampling.tick_ms > 60 * 60 * 1000 {
            eyre::bail!("sampling.tick_ms is unreasonably large (>1h)");
        }

        // Sensor
        if !(self.sensor.scale_divisor.is_finite() && self.sensor.scale_divisor > 0.0) {
            eyre::bail!("sensor.scale_divisor must be > 0");
        }
        if !(self.sensor.ceiling.is_finite() && self.sensor.ceiling > 0.0) {
            eyre::bail!("sensor.ceiling must be > 0");
        }
        if self.sensor.sim.base_raw >= self.photodiode.adc_full_scale {
            eyre::bail!("sensor.sim.base_raw must be below photodiode.adc_full_scale");
        }
        if self.sensor.sim.jitter_raw >= self.photodiode.adc_full_scale {
            eyre::bail!("sensor.sim.jitter_raw must be below photodiode.adc_full_scale");
        }

        // Photodiode
        if !(self.photodiode.vref.is_finite() && self.photodiode.vref > 0.0) {
            eyre::bail!("photodiode.vref must be > 0");
        }
        if self.photodiode.adc_full_scale < 2 {
            eyre::bail!("photodiode.adc_full_scale must be >= 2");
        }
        if !(self.photodiode.load_ohms.is_finite() && self.photodiode.load_ohms > 0.0) {
            eyre::bail!("photodiode.load_ohms must be > 0");
        }
        if !(self.photodiode.lux_per_amp.is_finite() && self.photodiode.lux_per_amp > 0.0) {
            eyre::bail!("photodiode.lux_per_amp must be > 0");
        }

        // Aggregation
        let lo = self.aggregation.collapse_max_std_dev;
        let hi = self.aggregation.passthrough_min_std_dev;
        if !(lo.is_finite() && hi.is_finite()) {
            eyre::bail!("aggregation thresholds must be finite");
        }
        if lo < 0.0 {
            eyre::bail!("aggregation.collapse_max_std_dev must be >= 0");
        }
        if lo >= hi {
            eyre::bail!(
                "aggregation.collapse_max_std_dev must be < aggregation.passthrough_min_std_dev"
            );
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// Read replay readings from any CSV reader with a strict `lux` header.
pub fn read_replay<R: std::io::Read>(mut rdr: csv::Reader<R>) -> eyre::Result<Vec<f32>> {
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read replay CSV headers: {}", e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.trim().to_string()).collect();
    if actual != ["lux"] {
        eyre::bail!(
            "replay CSV must have a single 'lux' header, got: {}",
            actual.join(",")
        );
    }

    let mut out = Vec::new();
    for (idx, rec) in rdr.deserialize::<ReplayRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        if !row.lux.is_finite() {
            eyre::bail!("invalid CSV row {}: lux must be finite", idx + 2);
        }
        out.push(row.lux);
    }
    Ok(out)
}

pub fn load_replay_csv(path: &Path) -> eyre::Result<Vec<f32>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open replay CSV {:?}: {}", path, e))?;
    read_replay(rdr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_reference_config() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.sampling.tick_ms, 500);
        assert_eq!(cfg.sensor.kind, SensorKind::Sim);
        assert_eq!(cfg.aggregation.collapse_max_std_dev, 20.0);
        assert_eq!(cfg.aggregation.passthrough_min_std_dev, 40.0);
        assert_eq!(cfg.report.format, ReportFormat::Text);
        cfg.validate().unwrap();
    }

    #[test]
    fn reader_accepts_whitespace_around_values() {
        let data = "lux\n 1.5\n2.0 \n";
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        assert_eq!(read_replay(rdr).unwrap(), vec![1.5, 2.0]);
    }
}
