//! Output sink for reduced windows.

use crate::cycle::CycleResult;
use crate::error::Result;

/// Renders cycle output. Errors abort the run that is feeding the reporter.
pub trait Reporter {
    /// Progress notification for a reading that entered the window.
    fn sample(&mut self, reading: f32, count: usize) -> Result<()> {
        let _ = (reading, count);
        Ok(())
    }

    fn emit(&mut self, result: &CycleResult) -> Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn sample(&mut self, reading: f32, count: usize) -> Result<()> {
        (**self).sample(reading, count)
    }

    fn emit(&mut self, result: &CycleResult) -> Result<()> {
        (**self).emit(result)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn sample(&mut self, reading: f32, count: usize) -> Result<()> {
        (**self).sample(reading, count)
    }

    fn emit(&mut self, result: &CycleResult) -> Result<()> {
        (**self).emit(result)
    }
}
