#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core aggregation logic (hardware-agnostic).
//!
//! This crate holds the sampling/statistics/aggregation state machine of the
//! light-sensing node. The sensor and the tick scheduler are reached only
//! through `luxagg_traits::LightSensor` and `luxagg_traits::TickSource`.
//!
//! ## Architecture
//!
//! - **Window**: fixed 12-slot buffer with a running sum (`window`)
//! - **Statistics**: mean, population variance, Babylonian std_dev (`stats`)
//! - **Aggregation**: std_dev band → Collapse / GroupOfFour / Passthrough (`aggregation`)
//! - **Cycle**: one step per tick, fill then reduce (`cycle`, `builder`)
//! - **Runner**: drives a cycle from a tick source into a `Reporter` (`runner`)
//! - **Ticker**: background periodic tick thread (`ticker`)
//!
//! ## Numeric model
//!
//! Readings are `f32`. The running sum, mean, variance and std_dev are `f64`,
//! so a window's sum avoids f32 cancellation error.

pub mod aggregation;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod cycle;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod report;
pub mod runner;
pub mod stats;
pub mod ticker;
pub mod util;
pub mod window;

pub use aggregation::{Aggregation, Band, Thresholds};
pub use builder::{CycleBuilder, Missing};
pub use config::{DEFAULT_READING_CEILING, DEFAULT_TICK_MS, SamplingCfg, SensorLimits};
pub use cycle::{Cycle, CycleEvent, CyclePhase, CycleResult, condition_reading};
pub use error::{BuildError, CoreError, Result};
pub use report::Reporter;
pub use runner::{RunLimit, RunSummary, StopReason, run};
pub use stats::{SqrtOutcome, Statistics};
pub use ticker::{ImmediateTicks, ShutdownHandle, Ticker};
pub use window::{WINDOW_CAPACITY, Window};
