//! Dispersion-driven choice of how hard to compress a full window.
//!
//! | std_dev                      | band          | output             |
//! |------------------------------|---------------|--------------------|
//! | `<= collapse_max`            | `Collapse`    | mean of all 12     |
//! | between the thresholds       | `GroupOfFour` | three group means  |
//! | `>= passthrough_min` or NaN  | `Passthrough` | the 12 readings    |

use crate::error::BuildError;
use crate::window::WINDOW_CAPACITY;

/// Readings averaged into each value of the four-into-one scheme.
pub const GROUP_SIZE: usize = 4;
const GROUPS: usize = WINDOW_CAPACITY / GROUP_SIZE;

/// Band boundaries on the window's standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub collapse_max: f64,
    pub passthrough_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            collapse_max: 20.0,
            passthrough_min: 40.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), BuildError> {
        if !(self.collapse_max.is_finite() && self.passthrough_min.is_finite()) {
            return Err(BuildError::InvalidConfig("thresholds must be finite"));
        }
        if self.collapse_max < 0.0 {
            return Err(BuildError::InvalidConfig("collapse_max must be >= 0"));
        }
        if self.collapse_max >= self.passthrough_min {
            return Err(BuildError::InvalidConfig(
                "collapse_max must be < passthrough_min",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Collapse,
    GroupOfFour,
    Passthrough,
}

impl Band {
    /// Band for `std_dev`. Every value, NaN included, lands in exactly one band.
    pub fn select(std_dev: f64, t: &Thresholds) -> Self {
        match std_dev {
            s if s <= t.collapse_max => Self::Collapse,
            s if s < t.passthrough_min => Self::GroupOfFour,
            _ => Self::Passthrough,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Collapse => "12-into-1",
            Self::GroupOfFour => "4-into-1",
            Self::Passthrough => "No aggregation",
        }
    }

    pub const fn output_len(self) -> usize {
        match self {
            Self::Collapse => 1,
            Self::GroupOfFour => GROUPS,
            Self::Passthrough => WINDOW_CAPACITY,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A reduced window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Collapse([f64; 1]),
    GroupOfFour([f64; GROUPS]),
    Passthrough([f64; WINDOW_CAPACITY]),
}

impl Aggregation {
    /// Reduce `readings` according to `band`. `mean` is the window mean already
    /// computed from the running sum.
    pub fn reduce(band: Band, readings: &[f32; WINDOW_CAPACITY], mean: f64) -> Self {
        match band {
            Band::Collapse => Self::Collapse([mean]),
            Band::GroupOfFour => {
                let mut out = [0.0; GROUPS];
                for (slot, chunk) in out.iter_mut().zip(readings.chunks_exact(GROUP_SIZE)) {
                    *slot = chunk.iter().map(|&r| f64::from(r)).sum::<f64>() / GROUP_SIZE as f64;
                }
                Self::GroupOfFour(out)
            }
            Band::Passthrough => Self::Passthrough(readings.map(f64::from)),
        }
    }

    /// Select the band for `std_dev` and reduce in one go.
    pub fn select(
        std_dev: f64,
        thresholds: &Thresholds,
        readings: &[f32; WINDOW_CAPACITY],
        mean: f64,
    ) -> Self {
        Self::reduce(Band::select(std_dev, thresholds), readings, mean)
    }

    pub const fn band(&self) -> Band {
        match self {
            Self::Collapse(_) => Band::Collapse,
            Self::GroupOfFour(_) => Band::GroupOfFour,
            Self::Passthrough(_) => Band::Passthrough,
        }
    }

    pub const fn label(&self) -> &'static str {
        self.band().label()
    }

    pub fn values(&self) -> &[f64] {
        match self {
            Self::Collapse(v) => v,
            Self::GroupOfFour(v) => v,
            Self::Passthrough(v) => v,
        }
    }
}
