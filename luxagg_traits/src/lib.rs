pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Source of calibrated ambient-light readings.
///
/// `read_lux` returns intensity in lux-equivalent units, already scaled down
/// by the sensor's configured divisor.
pub trait LightSensor {
    /// Power up the sensor. Called once before the first read and never undone.
    fn activate(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn read_lux(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: LightSensor + ?Sized> LightSensor for Box<T> {
    fn activate(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).activate()
    }

    fn read_lux(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_lux()
    }
}

/// Periodic timer events.
///
/// `next_tick` blocks until the next event and returns its sequence number,
/// or `None` once the source has closed and no further ticks will arrive.
pub trait TickSource {
    fn next_tick(&mut self) -> Option<u64>;
}
