//! Leaf statistical calculators
//!
//! - Descriptive statistics over a numeric sample
//! - Ordinary least-squares trend slope
//! - Pearson correlation of period-keyed series
//!
//! All routines work on unrounded values. Rounding happens once, when a
//! result object is built for output, via [`round_to`].

pub mod descriptive;
pub mod pearson;
pub mod trend;

pub use descriptive::{calculate_statistics, Statistics};
pub use pearson::pearson_correlation;
pub use trend::{linear_regression_slope, TrendDirection};

/// Round a value to `decimals` places, mapping non-finite input to 0
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.98765, 3), -0.988);
        assert_eq!(round_to(1850.0, 2), 1850.0);
    }

    #[test]
    fn test_round_non_finite() {
        assert_eq!(round_to(f64::NAN, 2), 0.0);
        assert_eq!(round_to(f64::INFINITY, 2), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
