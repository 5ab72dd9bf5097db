//! Human-readable error descriptions, exit codes and structured JSON errors.

use luxagg_core::error::{BuildError, CoreError};
use std::fmt;

/// Which part of start-up an error came from. Attached with `wrap_err` so the
/// exit code survives any later context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    ReplayData,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Config => f.write_str("invalid configuration"),
            Stage::ReplayData => f.write_str("unusable replay data"),
        }
    }
}

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_SENSOR: i32 = 3;
pub const EXIT_REPLAY_DATA: i32 = 4;

fn is_sensor_error(e: &CoreError) -> bool {
    matches!(
        e,
        CoreError::Sensor(_) | CoreError::SensorFault(_) | CoreError::Timeout
    )
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    let chain = format!("{err:#}");

    match err.downcast_ref::<Stage>() {
        Some(Stage::Config) => {
            return format!(
                "What happened: Invalid configuration ({chain}).\nLikely causes: Missing or out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file (see etc/luxagg.toml for a sample) or the flags, then rerun."
            );
        }
        Some(Stage::ReplayData) => {
            return format!(
                "What happened: Replay data could not be used ({chain}).\nLikely causes: Missing file, a header other than `lux`, or non-numeric/non-finite rows.\nHow to fix: Provide a CSV with a single `lux` column and one finite reading per row."
            );
        }
        None => {}
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Aggregation thresholds out of order or a non-positive ceiling.\nHow to fix: Check [aggregation] and [sensor] in the config."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CoreError>() {
        if is_sensor_error(ce) {
            return format!(
                "What happened: The light sensor failed ({ce}).\nLikely causes: Invalid [photodiode] parameters or an unavailable sensor backend.\nHow to fix: Run `luxagg self-check` with --log-level=debug and check the [sensor] and [photodiode] sections."
            );
        }
        return format!(
            "What happened: {ce}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    format!(
        "Something went wrong: {chain}\nHow to fix: Re-run with --log-level=debug for details."
    )
}

/// Stable exit codes: 2 config, 3 sensor, 4 replay data, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<Stage>() {
        Some(Stage::Config) => return EXIT_CONFIG,
        Some(Stage::ReplayData) => return EXIT_REPLAY_DATA,
        None => {}
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_CONFIG;
    }
    if err.downcast_ref::<CoreError>().is_some_and(is_sensor_error) {
        return EXIT_SENSOR;
    }
    EXIT_GENERIC
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        EXIT_CONFIG => "Config",
        EXIT_SENSOR => "Sensor",
        EXIT_REPLAY_DATA => "ReplayData",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
