//! Linear trend estimation
//!
//! Ordinary least-squares slope over an ordered sequence, and the
//! increasing/decreasing/stable classification used by consumers.

use crate::constants::trend::DIRECTION_DEADBAND;
use serde::{Deserialize, Serialize};

/// Direction of a trend slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a slope, treating |slope| <= 0.01 as noise
    pub fn from_slope(slope: f64) -> Self {
        if slope > DIRECTION_DEADBAND {
            Self::Increasing
        } else if slope < -DIRECTION_DEADBAND {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// OLS slope of `y` against `x`
///
/// `(n*Sxy - Sx*Sy) / (n*Sxx - Sx^2)`. Returns 0 when the denominator is
/// zero (fewer than two points, or all x identical). Extra elements of the
/// longer slice are ignored.
pub fn linear_regression_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_x2 += xi * xi;
    }

    let nf = n as f64;
    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

/// Slope of `y` against its period index `0..n`
pub fn index_slope(y: &[f64]) -> f64 {
    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    linear_regression_slope(&x, y)
}
