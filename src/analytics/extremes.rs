//! Extreme event detection over raw district samples
//!
//! An event is any sample at or above the value found at the requested
//! percentile of the descending-sorted samples. Events are graded by how
//! close they come to the maximum observed value.

use crate::constants::precision;
use crate::error::{Error, Result};
use crate::model::EmissionSample;
use crate::stats::round_to;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the maximum at which an event counts as extreme
const EXTREME_FRACTION_OF_MAX: f64 = 0.95;

/// Top fraction of samples graded at least high
const HIGH_FRACTION: f64 = 0.05;

/// Severity grade of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Extreme,
    High,
    Moderate,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Extreme => write!(f, "extreme"),
            Severity::High => write!(f, "high"),
            Severity::Moderate => write!(f, "moderate"),
        }
    }
}

/// A sample flagged as an extreme event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEvent {
    pub date: NaiveDate,
    pub value: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Severity,
}

/// Summary of the detected events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeStatistics {
    pub threshold_value: f64,
    pub threshold_percentile: f64,
    pub total_events: usize,
    /// Events as a percentage of all samples
    pub event_frequency: f64,
    pub max_value: f64,
    pub avg_extreme_value: f64,
}

/// Extreme events of one district
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEventsReport {
    pub state: String,
    pub district: String,
    /// Events, highest value first
    pub extreme_events: Vec<ExtremeEvent>,
    pub statistics: ExtremeStatistics,
    pub generated_at: DateTime<Utc>,
}

/// Result of [`detect_extremes`] before it is attached to a district
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub events: Vec<ExtremeEvent>,
    pub statistics: ExtremeStatistics,
}

/// Find samples at or above the `percentile` threshold
///
/// Returns `Ok(None)` for an empty sample set.
///
/// # Errors
/// [`Error::Precondition`] if `percentile` is not in `(0, 100]`.
pub fn detect_extremes(samples: &[EmissionSample], percentile: f64) -> Result<Option<Detection>> {
    if !(percentile > 0.0 && percentile <= 100.0) {
        return Err(Error::Precondition(format!(
            "Percentile {} is out of range (0, 100]",
            percentile
        )));
    }
    if samples.is_empty() {
        return Ok(None);
    }

    let mut sorted: Vec<&EmissionSample> = samples.iter().collect();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));

    let n = sorted.len();
    let last = n - 1;
    let threshold_index = ((n as f64 * (100.0 - percentile) / 100.0).floor() as usize).min(last);
    let high_index = ((n as f64 * HIGH_FRACTION).floor() as usize).min(last);

    let threshold = sorted[threshold_index].value;
    let max_value = sorted[0].value;
    let high_value = sorted[high_index].value;

    let events: Vec<ExtremeEvent> = sorted
        .iter()
        .take_while(|s| s.value >= threshold)
        .map(|s| {
            let severity = if s.value >= max_value * EXTREME_FRACTION_OF_MAX {
                Severity::Extreme
            } else if s.value >= high_value {
                Severity::High
            } else {
                Severity::Moderate
            };
            ExtremeEvent {
                date: s.date,
                value: round_to(s.value, precision::VALUE_DECIMALS),
                latitude: s.latitude,
                longitude: s.longitude,
                severity,
            }
        })
        .collect();

    let total = events.len();
    let event_sum: f64 = sorted[..total].iter().map(|s| s.value).sum();
    let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);

    let statistics = ExtremeStatistics {
        threshold_value: r(threshold),
        threshold_percentile: percentile,
        total_events: total,
        event_frequency: r(total as f64 / n as f64 * 100.0),
        max_value: r(max_value),
        avg_extreme_value: r(event_sum / total as f64),
    };

    Ok(Some(Detection { events, statistics }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<EmissionSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2021, 1, 1 + i as u32 % 28).unwrap();
                EmissionSample::new(10.0, 76.0, *v, date)
            })
            .collect()
    }

    fn ramp(n: usize) -> Vec<EmissionSample> {
        let values: Vec<f64> = (0..n).map(|i| 1800.0 + i as f64).collect();
        samples(&values)
    }

    #[test]
    fn test_percentile_validation() {
        let data = ramp(10);
        assert!(matches!(detect_extremes(&data, 0.0), Err(Error::Precondition(_))));
        assert!(matches!(detect_extremes(&data, -5.0), Err(Error::Precondition(_))));
        assert!(matches!(detect_extremes(&data, 100.5), Err(Error::Precondition(_))));
        assert!(detect_extremes(&data, 100.0).is_ok());
    }

    #[test]
    fn test_empty_samples() {
        assert!(detect_extremes(&[], 90.0).unwrap().is_none());
    }

    #[test]
    fn test_ninetieth_percentile() {
        // 100 samples 1800..1899: threshold at index 10 of the descending list
        let detection = detect_extremes(&ramp(100), 90.0).unwrap().unwrap();

        assert_eq!(detection.statistics.threshold_value, 1889.0);
        assert_eq!(detection.statistics.total_events, 11);
        assert_eq!(detection.statistics.event_frequency, 11.0);
        assert_eq!(detection.statistics.max_value, 1899.0);
        assert_eq!(detection.statistics.avg_extreme_value, 1894.0);
        assert_eq!(detection.events[0].value, 1899.0);
        assert!(detection.events.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_severity_grades() {
        // max 2000 -> extreme from 1900; high index floor(20 * 0.05) = 1
        let mut values = vec![2000.0, 1890.0, 1850.0];
        values.extend(std::iter::repeat(1000.0).take(17));
        let detection = detect_extremes(&samples(&values), 90.0).unwrap().unwrap();

        // threshold index floor(20 * 0.1) = 2 -> 1850
        let grades: Vec<Severity> = detection.events.iter().map(|e| e.severity).collect();
        assert_eq!(
            grades,
            vec![Severity::Extreme, Severity::High, Severity::Moderate]
        );
    }

    #[test]
    fn test_full_percentile_keeps_top_value() {
        let detection = detect_extremes(&ramp(10), 100.0).unwrap().unwrap();
        assert_eq!(detection.statistics.total_events, 1);
        assert_eq!(detection.events[0].severity, Severity::Extreme);
    }

    #[test]
    fn test_small_percentile_clamps_to_last() {
        let detection = detect_extremes(&ramp(5), 0.1).unwrap().unwrap();
        assert_eq!(detection.statistics.total_events, 5);
        assert_eq!(detection.statistics.threshold_value, 1800.0);
    }
}
