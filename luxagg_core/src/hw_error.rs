//! Maps `Box<dyn Error>` from trait boundaries to typed `CoreError`.
//!
//! `luxagg_traits::LightSensor` returns boxed errors; this module turns them
//! into `CoreError`, downcasting `luxagg_hardware::HwError` when the
//! `hardware-errors` feature is on.

use crate::error::CoreError;

/// Map a sensor error to a typed `CoreError`.
///
/// Known hardware error types are downcast first, then string heuristics apply.
pub fn map_sensor_error(e: &(dyn std::error::Error + 'static)) -> CoreError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<luxagg_hardware::HwError>() {
            return match hw {
                luxagg_hardware::HwError::Exhausted(_) => CoreError::SourceExhausted,
                other => CoreError::SensorFault(other.to_string()),
            };
        }
    }

    if let Some(core) = e.downcast_ref::<CoreError>() {
        return core.clone();
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        CoreError::Timeout
    } else {
        CoreError::Sensor(s)
    }
}
