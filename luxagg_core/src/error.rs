use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Append on a full window. Only reachable through a state-machine defect.
    #[error("window capacity exceeded ({capacity} readings)")]
    CapacityExceeded { capacity: usize },
    /// Reduction requested before the window filled.
    #[error("window incomplete ({len} readings)")]
    Incomplete { len: usize },
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("sensor fault: {0}")]
    SensorFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid reading: {0}")]
    InvalidReading(f32),
    #[error("sample source exhausted")]
    SourceExhausted,
    #[error("cycle not started; call begin() first")]
    NotStarted,
}

impl CoreError {
    /// Errors that indicate a broken state machine rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. } | Self::Incomplete { .. })
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
