//! Descriptive statistics
//!
//! Mean, min, max, median and population standard deviation over a
//! numeric sample. An empty sample is a valid "no data" state, not an error.

use crate::constants::{emission, precision};
use crate::stats::round_to;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Population standard deviation (divides by n)
    pub std: f64,
    pub count: usize,

    /// Lower end of the colour scale; falls back to a fixed range when empty
    pub data_min: f64,
    /// Upper end of the colour scale
    pub data_max: f64,
}

impl Statistics {
    /// The "no data" statistics: all zero, default colour range
    pub fn empty() -> Self {
        Self {
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            median: 0.0,
            std: 0.0,
            count: 0,
            data_min: emission::DEFAULT_COLOR_MIN,
            data_max: emission::DEFAULT_COLOR_MAX,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy with every value rounded for output
    pub fn rounded(&self) -> Self {
        let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);
        Self {
            mean: r(self.mean),
            min: r(self.min),
            max: r(self.max),
            median: r(self.median),
            std: r(self.std),
            count: self.count,
            data_min: r(self.data_min),
            data_max: r(self.data_max),
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute descriptive statistics
///
/// # Median
/// Even n: average of the two central sorted values.
/// Odd n: the sorted value at index `floor(n / 2)`.
pub fn calculate_statistics(values: &[f64]) -> Statistics {
    if values.is_empty() {
        return Statistics::empty();
    }

    let count = values.len();
    let n = count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let min = sorted[0];
    let max = sorted[count - 1];
    let mean = sorted.iter().sum::<f64>() / n;

    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    Statistics {
        mean,
        min,
        max,
        median,
        std: variance.sqrt(),
        count,
        data_min: min,
        data_max: max,
    }
}
