use eyre::WrapErr;
use luxagg_traits::{LightSensor, TickSource};

use crate::aggregation::Band;
use crate::cycle::{Cycle, CycleEvent};
use crate::error::{CoreError, Result};
use crate::report::Reporter;

/// Optional bounds on a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimit {
    /// Stop after this many reduced windows.
    pub max_cycles: Option<u64>,
}

impl RunLimit {
    pub fn cycles(n: u64) -> Self {
        Self {
            max_cycles: Some(n),
        }
    }

    #[inline]
    fn reached(&self, cycles: u64) -> bool {
        self.max_cycles.is_some_and(|max| cycles >= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The tick source closed (shutdown requested).
    TicksClosed,
    /// A finite sensor ran out of readings.
    SourceExhausted,
    /// `RunLimit::max_cycles` reached.
    CycleLimit,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub samples: u64,
    pub clamped: u64,
    pub rejected: u64,
    pub cycles: u64,
    pub collapse: u64,
    pub group_of_four: u64,
    pub passthrough: u64,
    pub invariant_violations: u64,
    /// Ticks dropped by the tick source; filled in by the owner of the ticker.
    pub missed_ticks: u64,
    /// Readings in the window when the run stopped.
    pub discarded: usize,
    pub stop: StopReason,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            ticks: 0,
            samples: 0,
            clamped: 0,
            rejected: 0,
            cycles: 0,
            collapse: 0,
            group_of_four: 0,
            passthrough: 0,
            invariant_violations: 0,
            missed_ticks: 0,
            discarded: 0,
            stop: StopReason::TicksClosed,
        }
    }

    fn count_band(&mut self, band: Band) {
        match band {
            Band::Collapse => self.collapse += 1,
            Band::GroupOfFour => self.group_of_four += 1,
            Band::Passthrough => self.passthrough += 1,
        }
    }
}

/// Drive `cycle` one step per tick until the ticks stop, the sensor runs dry
/// or `limit` is reached.
///
/// Sensor failures are counted and skipped. Invariant violations are logged,
/// the window is reset and the run continues. Reporter errors end the run.
pub fn run<S, T, R>(
    cycle: &mut Cycle<S>,
    ticks: &mut T,
    reporter: &mut R,
    limit: RunLimit,
) -> Result<RunSummary>
where
    S: LightSensor,
    T: TickSource + ?Sized,
    R: Reporter + ?Sized,
{
    cycle.begin().wrap_err("start aggregation cycle")?;
    let mut summary = RunSummary::new();

    if limit.reached(0) {
        summary.stop = StopReason::CycleLimit;
        return Ok(summary);
    }

    while let Some(tick) = ticks.next_tick() {
        summary.ticks += 1;
        let event = match cycle.step() {
            Ok(ev) => ev,
            Err(report) => match report.downcast_ref::<CoreError>() {
                Some(e) if e.is_invariant_violation() => {
                    tracing::error!(tick, error = %e, "cycle invariant violated");
                    summary.invariant_violations += 1;
                    cycle.recover();
                    continue;
                }
                _ => return Err(report),
            },
        };

        match event {
            CycleEvent::Sampled {
                reading,
                count,
                clamped,
            } => {
                summary.samples += 1;
                if clamped {
                    summary.clamped += 1;
                }
                reporter.sample(reading, count).wrap_err("report sample")?;
            }
            CycleEvent::Rejected(CoreError::SourceExhausted) => {
                summary.stop = StopReason::SourceExhausted;
                break;
            }
            CycleEvent::Rejected(_) => summary.rejected += 1,
            CycleEvent::Reduced(result) => {
                summary.cycles += 1;
                summary.count_band(result.band());
                reporter.emit(&result).wrap_err("report cycle")?;
                if limit.reached(summary.cycles) {
                    summary.stop = StopReason::CycleLimit;
                    break;
                }
            }
        }
    }

    summary.discarded = cycle.window().len();
    if summary.discarded > 0 {
        tracing::info!(
            discarded = summary.discarded,
            "partial window dropped at end of run"
        );
    }
    tracing::info!(
        ticks = summary.ticks,
        samples = summary.samples,
        cycles = summary.cycles,
        rejected = summary.rejected,
        clamped = summary.clamped,
        stop = ?summary.stop,
        "run finished"
    );
    Ok(summary)
}
