//! Acceptance windows over numeric anime attributes.
//!
//! The spread measure here is NOT a textbook standard deviation: the sum of
//! squared deviations is square-rooted without dividing by `n`, so it grows
//! with the sample size. Windows built from it are wider than mean ± σ and
//! the recommendation results depend on that width.

use serde::{Deserialize, Serialize};

/// Inclusive integer range used to prune candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceWindow {
    pub lower: i32,
    pub upper: i32,
}

impl AcceptanceWindow {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Lower-bound treatment for an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerBound {
    /// Lower bounds at or below zero become 1 (episode counts)
    AtLeastOne,
    /// No clamping (air years)
    Unclamped,
}

/// sqrt(Σ (x - mean)²) over the whole sample; 0 for an empty sample
pub fn dispersion(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }

    let mean = mean(sample);
    sample
        .iter()
        .map(|x| (x - mean).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Rounds half-way values towards positive infinity (-2.5 becomes -2)
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Window of mean ± dispersion, rounded to integers
///
/// An empty sample yields `(0, 0)` without clamping.
pub fn acceptance_window(sample: &[f64], lower_bound: LowerBound) -> AcceptanceWindow {
    if sample.is_empty() {
        return AcceptanceWindow::new(0, 0);
    }

    let mean = mean(sample);
    let spread = dispersion(sample);

    let lower = round_half_up(mean - spread);
    let upper = round_half_up(mean + spread);

    let lower = match lower_bound {
        LowerBound::AtLeastOne if lower <= 0 => 1,
        _ => lower,
    };

    AcceptanceWindow::new(lower, upper)
}
