//! Sensor assembly and the `run`, `analyze` and `self-check` commands.

use std::path::Path;

use eyre::WrapErr;
use luxagg_config::{Config, ReportFormat, SensorKind};
use luxagg_core::hw_error::map_sensor_error;
use luxagg_core::{
    Cycle, ImmediateTicks, Reporter, RunLimit, RunSummary, SamplingCfg, SensorLimits, Thresholds,
    Ticker,
};
use luxagg_hardware::{Photodiode, ReplayLightSensor, SimParams, SimulatedLightSensor};
use luxagg_traits::{LightSensor, MonotonicClock, TickSource};

use crate::error_fmt::Stage;
use crate::report::{JsonReporter, TextReporter};

pub type BoxedSensor = Box<dyn LightSensor + Send>;

fn photodiode(cfg: &Config) -> Photodiode {
    Photodiode {
        vref: cfg.photodiode.vref,
        adc_full_scale: cfg.photodiode.adc_full_scale,
        load_ohms: cfg.photodiode.load_ohms,
        lux_per_amp: cfg.photodiode.lux_per_amp,
    }
}

fn sim_params(cfg: &Config) -> SimParams {
    let s = &cfg.sensor.sim;
    SimParams {
        base_raw: s.base_raw,
        jitter_raw: s.jitter_raw,
        seed: s.seed,
        burst_every: s.burst_every,
        burst_raw: s.burst_raw,
    }
}

fn replay_sensor(path: &Path) -> eyre::Result<BoxedSensor> {
    let readings = luxagg_config::load_replay_csv(path).wrap_err(Stage::ReplayData)?;
    tracing::info!(path = %path.display(), readings = readings.len(), "replay data loaded");
    Ok(Box::new(ReplayLightSensor::new(readings)))
}

/// Build the sensor selected by config; `replay` overrides `sensor.kind`.
pub fn build_sensor(cfg: &Config, replay: Option<&Path>) -> eyre::Result<BoxedSensor> {
    if let Some(path) = replay {
        return replay_sensor(path);
    }
    match cfg.sensor.kind {
        SensorKind::Sim => {
            tracing::info!(
                base_raw = cfg.sensor.sim.base_raw,
                jitter_raw = cfg.sensor.sim.jitter_raw,
                scale_divisor = cfg.sensor.scale_divisor,
                "using simulated light sensor"
            );
            Ok(Box::new(SimulatedLightSensor::new(
                sim_params(cfg),
                photodiode(cfg),
                cfg.sensor.scale_divisor,
            )))
        }
        SensorKind::Replay => {
            let path = cfg.sensor.replay_csv.as_deref().ok_or_else(|| {
                eyre::eyre!("sensor.kind = \"replay\" requires sensor.replay_csv or --replay")
                    .wrap_err(Stage::Config)
            })?;
            replay_sensor(path)
        }
    }
}

fn build_cycle(cfg: &Config, sensor: BoxedSensor) -> eyre::Result<Cycle<BoxedSensor>> {
    Cycle::builder()
        .with_sensor(sensor)
        .with_thresholds(Thresholds::from(&cfg.aggregation))
        .with_limits(SensorLimits::from(&cfg.sensor))
        .build()
        .wrap_err(Stage::Config)
}

fn make_reporter(cfg: &Config, json: bool, progress: bool) -> Box<dyn Reporter> {
    if json || cfg.report.format == ReportFormat::Json {
        Box::new(JsonReporter::new(std::io::stdout()))
    } else {
        Box::new(TextReporter::new(std::io::stdout()).with_progress(progress))
    }
}

fn log_summary(s: &RunSummary) {
    tracing::info!(
        ticks = s.ticks,
        missed_ticks = s.missed_ticks,
        samples = s.samples,
        clamped = s.clamped,
        rejected = s.rejected,
        cycles = s.cycles,
        collapse = s.collapse,
        group_of_four = s.group_of_four,
        passthrough = s.passthrough,
        invariant_violations = s.invariant_violations,
        discarded = s.discarded,
        stop = ?s.stop,
        "run summary"
    );
}

pub struct RunOpts<'a> {
    pub cycles: Option<u64>,
    pub tick_ms: Option<u64>,
    pub replay: Option<&'a Path>,
    pub json: bool,
}

/// Sample on a real-time ticker until Ctrl-C, the cycle limit or replay exhaustion.
pub fn run(cfg: &Config, opts: &RunOpts<'_>) -> eyre::Result<RunSummary> {
    let mut sampling = SamplingCfg::from(&cfg.sampling);
    if let Some(ms) = opts.tick_ms {
        if ms == 0 {
            return Err(eyre::eyre!("--tick-ms must be >= 1").wrap_err(Stage::Config));
        }
        sampling.tick_ms = ms;
    }

    let sensor = build_sensor(cfg, opts.replay)?;
    let mut cycle = build_cycle(cfg, sensor)?;
    let mut reporter = make_reporter(cfg, opts.json, true);

    let mut ticker = Ticker::spawn(sampling.period(), MonotonicClock::new());
    let handle = ticker.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || handle.shutdown()) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
    tracing::info!(
        tick_ms = sampling.tick_ms,
        cycles = ?opts.cycles,
        "sampling started"
    );

    let limit = RunLimit {
        max_cycles: opts.cycles,
    };
    let mut summary = luxagg_core::run(&mut cycle, &mut ticker, &mut reporter, limit)?;
    summary.missed_ticks = ticker.missed();
    drop(ticker);
    log_summary(&summary);
    Ok(summary)
}

/// Push a recorded CSV through the cycle as fast as possible.
pub fn analyze(cfg: &Config, csv: &Path, json: bool) -> eyre::Result<RunSummary> {
    let sensor = replay_sensor(csv)?;
    let mut cycle = build_cycle(cfg, sensor)?;
    let mut reporter = make_reporter(cfg, json, false);
    let mut ticks = ImmediateTicks::new();
    let summary = drive(&mut cycle, &mut ticks, &mut reporter)?;
    if summary.cycles == 0 {
        tracing::warn!(
            samples = summary.samples,
            "replay data did not fill a single window"
        );
    }
    log_summary(&summary);
    Ok(summary)
}

fn drive(
    cycle: &mut Cycle<BoxedSensor>,
    ticks: &mut dyn TickSource,
    reporter: &mut dyn Reporter,
) -> eyre::Result<RunSummary> {
    luxagg_core::run(cycle, ticks, reporter, RunLimit::default())
}

/// Activate the configured sensor and take a single conditioned reading.
pub fn self_check(cfg: &Config) -> eyre::Result<f32> {
    let mut sensor = build_sensor(cfg, None)?;
    sensor
        .activate()
        .map_err(|e| eyre::Report::new(map_sensor_error(&*e)))
        .wrap_err("activate light sensor")?;
    let raw = sensor
        .read_lux()
        .map_err(|e| eyre::Report::new(map_sensor_error(&*e)))
        .wrap_err("read light sensor")?;
    let (reading, clamped) = luxagg_core::condition_reading(raw, cfg.sensor.ceiling)
        .map_err(eyre::Report::new)
        .wrap_err("condition reading")?;
    tracing::info!(raw, reading, clamped, "self-check reading");
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxagg_core::StopReason;
    use std::io::Write;

    fn csv_file(rows: &[f32]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "lux").unwrap();
        for r in rows {
            writeln!(f, "{r}").unwrap();
        }
        f
    }

    #[test]
    fn default_sensor_is_simulated_and_in_range() {
        let cfg = Config::default();
        let reading = self_check(&cfg).unwrap();
        // 40 ± 8 counts at ~2.29 lux/count, scaled by 10
        assert!(reading > 7.0 && reading < 11.5, "reading={reading}");
    }

    #[test]
    fn replay_kind_without_path_is_a_config_error() {
        let mut cfg = Config::default();
        cfg.sensor.kind = SensorKind::Replay;
        let err = build_sensor(&cfg, None).err().unwrap();
        assert_eq!(crate::error_fmt::exit_code_for_error(&err), 2);
    }

    #[test]
    fn analyze_stops_at_end_of_data() {
        let f = csv_file(&[10.0; 30]);
        let summary = analyze(&Config::default(), f.path(), true).unwrap();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.stop, StopReason::SourceExhausted);
        assert_eq!(summary.discarded, 6);
    }
}
