//! Text and JSON renderings of reduced windows.
//!
//! Text output follows the node's console format:
//!
//! ```text
//! Light Reading 12: 9.61
//!
//! B = [9.155, 9.384, ...]
//! StdDev = 0.512
//! Aggregation: 12-into-1
//! X = [9.402]
//! ```

use std::io::Write;

use luxagg_core::{Band, CycleResult, Reporter};
use serde::Serialize;

fn fmt_list(values: impl IntoIterator<Item = f64>) -> String {
    let items: Vec<String> = values.into_iter().map(|v| format!("{v:.3}")).collect();
    format!("[{}]", items.join(", "))
}

pub struct TextReporter<W> {
    out: W,
    progress: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress: true,
        }
    }

    /// Print a line per sampled reading (default: on).
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn sample(&mut self, reading: f32, count: usize) -> eyre::Result<()> {
        if self.progress {
            writeln!(self.out, "Light Reading {count}: {reading:.2}")?;
        }
        Ok(())
    }

    fn emit(&mut self, result: &CycleResult) -> eyre::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "B = {}",
            fmt_list(result.readings.iter().map(|&r| f64::from(r)))
        )?;
        writeln!(self.out, "StdDev = {:.3}", result.std_dev())?;
        writeln!(self.out, "Aggregation: {}", result.aggregation.label())?;
        writeln!(self.out, "X = {}", fmt_list(result.reduced().iter().copied()))?;
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per reduced window.
#[derive(Debug, Serialize)]
pub struct CycleRecord<'a> {
    pub sequence: u64,
    pub readings: &'a [f32],
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub sqrt_iterations: u32,
    pub scheme: &'static str,
    pub aggregation: &'static str,
    pub reduced: &'a [f64],
}

pub fn scheme_name(band: Band) -> &'static str {
    match band {
        Band::Collapse => "collapse",
        Band::GroupOfFour => "group_of_four",
        Band::Passthrough => "passthrough",
    }
}

impl<'a> From<&'a CycleResult> for CycleRecord<'a> {
    fn from(r: &'a CycleResult) -> Self {
        Self {
            sequence: r.sequence,
            readings: &r.readings,
            mean: r.mean(),
            variance: r.stats.variance,
            std_dev: r.std_dev(),
            sqrt_iterations: r.stats.sqrt.iterations(),
            scheme: scheme_name(r.band()),
            aggregation: r.aggregation.label(),
            reduced: r.reduced(),
        }
    }
}

pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn emit(&mut self, result: &CycleResult) -> eyre::Result<()> {
        serde_json::to_writer(&mut self.out, &CycleRecord::from(result))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
