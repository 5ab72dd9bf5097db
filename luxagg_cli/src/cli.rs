//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "luxagg",
    version,
    about = "Adaptive light-sample aggregation node"
)]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the sensor on a fixed tick and report every reduced window
    Run {
        /// Stop after this many reported windows
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Override sampling.tick_ms
        #[arg(long, value_name = "MS")]
        tick_ms: Option<u64>,
        /// Read recorded readings from this CSV instead of the configured sensor
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },
    /// Aggregate a recorded CSV offline, without waiting between ticks
    Analyze {
        /// Replay CSV with a single `lux` column
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
    /// Build the configured sensor and take one reading
    SelfCheck,
}
