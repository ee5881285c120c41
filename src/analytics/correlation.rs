//! Pairwise correlation of district time series within a state

use crate::constants::precision;
use crate::stats::{pearson_correlation, round_to};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monthly means of one district keyed by `YYYY-MM`
pub type PeriodSeries = BTreeMap<String, f64>;

/// Correlation between two districts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub district_a: String,
    pub district_b: String,
    /// Pearson coefficient; 0 when fewer than two periods overlap
    pub coefficient: f64,
    /// Number of periods both districts share
    pub overlapping_periods: usize,
}

/// Correlation matrix and ranked pairs for a state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub state: String,
    /// district -> district -> coefficient, symmetric with unit diagonal
    pub matrix: BTreeMap<String, BTreeMap<String, f64>>,
    /// Unique pairs, strongest |coefficient| first
    pub pairs: Vec<CorrelationPair>,
    pub strongest: Vec<CorrelationPair>,
    pub weakest: Vec<CorrelationPair>,
    pub generated_at: DateTime<Utc>,
}

/// Correlate every pair of districts
///
/// Self-correlation is fixed at 1.0. Pairs are sorted by descending
/// |coefficient| with a stable sort, so ties keep enumeration order;
/// `weakest` is the tail of that order reversed.
pub fn correlate_districts(
    state: &str,
    series: &BTreeMap<String, PeriodSeries>,
    top_n: usize,
) -> CorrelationReport {
    let districts: Vec<&String> = series.keys().collect();
    let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut pairs = Vec::new();

    for (i, a) in districts.iter().enumerate() {
        let row = matrix.entry((*a).clone()).or_default();

        for (j, b) in districts.iter().enumerate() {
            let coefficient = if i == j {
                1.0
            } else {
                round_to(
                    pearson_correlation(&series[*a], &series[*b]),
                    precision::CORRELATION_DECIMALS,
                )
            };
            row.insert((*b).clone(), coefficient);

            if i < j {
                pairs.push(CorrelationPair {
                    district_a: (*a).clone(),
                    district_b: (*b).clone(),
                    coefficient,
                    overlapping_periods: overlap(&series[*a], &series[*b]),
                });
            }
        }
    }

    pairs.sort_by(|x, y| y.coefficient.abs().total_cmp(&x.coefficient.abs()));

    let strongest = pairs.iter().take(top_n).cloned().collect();
    let weakest = pairs.iter().rev().take(top_n).cloned().collect();

    CorrelationReport {
        state: state.to_string(),
        matrix,
        pairs,
        strongest,
        weakest,
        generated_at: Utc::now(),
    }
}

fn overlap(a: &PeriodSeries, b: &PeriodSeries) -> usize {
    a.keys().filter(|k| b.contains_key(*k)).count()
}
