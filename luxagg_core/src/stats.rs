//! Window statistics: mean, population variance and a Babylonian square root.
//!
//! The node has no hardware square root, so the standard deviation comes from
//! Newton–Raphson iteration seeded with the previous window's result:
//!
//! ```text
//! s ← ½ (s + v / s)    until |s² − v| < SQRT_TOLERANCE or MAX_SQRT_ITERATIONS steps
//! ```
//!
//! Running out of iterations is not an error; the last estimate is used.

use crate::window::{WINDOW_CAPACITY, Window};

/// Initial guess for the first window and after a window whose iteration
/// did not converge.
pub const SEED_GUESS: f64 = 10.0;
/// Iteration budget for the square-root approximation.
pub const MAX_SQRT_ITERATIONS: u32 = 50;
/// Convergence bound on `|s² − v|`.
pub const SQRT_TOLERANCE: f64 = 0.001;

/// How the square-root iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqrtOutcome {
    /// Variance was zero; the iteration was skipped and std_dev is 0.
    Degenerate,
    /// Tolerance met after `iterations` steps.
    Converged { iterations: u32 },
    /// Budget spent without meeting the tolerance.
    BudgetExhausted { iterations: u32 },
}

impl SqrtOutcome {
    pub fn iterations(self) -> u32 {
        match self {
            Self::Degenerate => 0,
            Self::Converged { iterations } | Self::BudgetExhausted { iterations } => iterations,
        }
    }
}

/// Approximate `sqrt(value)` starting from `guess`.
///
/// Values `<= 0` short-circuit to `(0.0, Degenerate)`. A guess that is not
/// finite and positive is replaced by [`SEED_GUESS`] so the first division is
/// always defined.
pub fn babylonian_sqrt(value: f64, guess: f64) -> (f64, SqrtOutcome) {
    if value <= 0.0 {
        return (0.0, SqrtOutcome::Degenerate);
    }
    let mut s = if guess.is_finite() && guess > 0.0 {
        guess
    } else {
        SEED_GUESS
    };
    for i in 1..=MAX_SQRT_ITERATIONS {
        s = 0.5 * (s + value / s);
        if (s * s - value).abs() < SQRT_TOLERANCE {
            return (s, SqrtOutcome::Converged { iterations: i });
        }
    }
    (
        s,
        SqrtOutcome::BudgetExhausted {
            iterations: MAX_SQRT_ITERATIONS,
        },
    )
}

/// Statistics of one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    /// Population variance (divides by the window size).
    pub variance: f64,
    /// Approximate square root of `variance`.
    pub std_dev: f64,
    pub sqrt: SqrtOutcome,
}

impl Statistics {
    /// Statistics of a full window using its running sum; `None` while filling.
    pub fn from_window(window: &Window, guess: f64) -> Option<Self> {
        let readings = window.as_full()?;
        Some(Self::compute_full(readings, window.sum(), guess))
    }

    /// Statistics of twelve readings given directly.
    pub fn from_readings(readings: &[f32; WINDOW_CAPACITY], guess: f64) -> Self {
        let sum: f64 = readings.iter().map(|&r| f64::from(r)).sum();
        Self::compute_full(readings, sum, guess)
    }

    pub(crate) fn compute_full(readings: &[f32; WINDOW_CAPACITY], sum: f64, guess: f64) -> Self {
        let n = WINDOW_CAPACITY as f64;
        let mean = sum / n;
        let variance = readings
            .iter()
            .map(|&r| {
                let d = f64::from(r) - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let (std_dev, sqrt) = babylonian_sqrt(variance, guess);
        if let SqrtOutcome::BudgetExhausted { iterations } = sqrt {
            tracing::debug!(
                variance,
                std_dev,
                iterations,
                "sqrt approximation budget exhausted; using last estimate"
            );
        }
        Self {
            mean,
            variance,
            std_dev,
            sqrt,
        }
    }
}
