//! Ranking of states and districts by mean emission

use crate::constants::precision;
use crate::model::{pool_aggregates, GeoKey, MonthlyAggregate};
use crate::stats::round_to;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sort direction of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Descending,
    Ascending,
}

/// One entry of a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRegion {
    /// 1-based position after filtering
    pub rank: usize,
    pub name: String,
    /// Parent state, set for district rankings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sample_count: usize,
}

/// State and district rankings for a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    /// `YYYY-MM`
    pub period: String,
    pub state_rankings: Vec<RankedRegion>,
    pub district_rankings: Vec<RankedRegion>,
    pub total_states: usize,
    pub total_districts: usize,
    pub generated_at: DateTime<Utc>,
}

/// Rank geographies by their pooled mean
///
/// Aggregates are pooled per key first, so several months of the same
/// geography count once. Keys without samples are dropped. Equal means
/// keep their key order. `limit` caps the list after ranking.
pub fn rank_regions(
    aggregates: &[MonthlyAggregate],
    order: RankOrder,
    limit: Option<usize>,
) -> Vec<RankedRegion> {
    let mut by_key: BTreeMap<&GeoKey, Vec<&MonthlyAggregate>> = BTreeMap::new();
    for agg in aggregates {
        by_key.entry(&agg.key).or_default().push(agg);
    }

    let mut pooled: Vec<(&GeoKey, _)> = by_key
        .into_iter()
        .filter_map(|(key, rows)| pool_aggregates(rows).map(|summary| (key, summary)))
        .collect();

    pooled.sort_by(|(_, a), (_, b)| match order {
        RankOrder::Descending => b.mean.total_cmp(&a.mean),
        RankOrder::Ascending => a.mean.total_cmp(&b.mean),
    });

    let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);

    pooled
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, (key, summary))| RankedRegion {
            rank: i + 1,
            name: key.name().to_string(),
            state: match key {
                GeoKey::District { state, .. } => Some(state.clone()),
                _ => None,
            },
            mean: r(summary.mean),
            min: r(summary.min),
            max: r(summary.max),
            sample_count: summary.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(key: GeoKey, month: u32, mean: f64, count: usize) -> MonthlyAggregate {
        MonthlyAggregate {
            key,
            year: 2021,
            month,
            mean,
            min: mean - 10.0,
            max: mean + 10.0,
            count,
            std: 10.0,
        }
    }

    #[test]
    fn test_two_states_descending() {
        let rows = vec![
            aggregate(GeoKey::state("b"), 1, 1850.0, 4),
            aggregate(GeoKey::state("a"), 1, 1950.0, 4),
        ];

        let ranking = rank_regions(&rows, RankOrder::Descending, None);
        assert_eq!(ranking.len(), 2);
        assert_eq!((ranking[0].rank, ranking[0].name.as_str()), (1, "A"));
        assert_eq!((ranking[1].rank, ranking[1].name.as_str()), (2, "B"));
        assert_eq!(ranking[0].mean, 1950.0);
        assert!(ranking[0].state.is_none());
    }

    #[test]
    fn test_ascending() {
        let rows = vec![
            aggregate(GeoKey::state("a"), 1, 1950.0, 4),
            aggregate(GeoKey::state("b"), 1, 1850.0, 4),
        ];
        let ranking = rank_regions(&rows, RankOrder::Ascending, None);
        assert_eq!(ranking[0].name, "B");
    }

    #[test]
    fn test_zero_samples_excluded() {
        let rows = vec![
            aggregate(GeoKey::state("a"), 1, 1950.0, 4),
            aggregate(GeoKey::state("empty"), 1, 0.0, 0),
            aggregate(GeoKey::state("b"), 1, 1850.0, 4),
        ];
        let ranking = rank_regions(&rows, RankOrder::Descending, None);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[1].rank, 2);
        assert_eq!(ranking[1].name, "B");
    }

    #[test]
    fn test_pools_months_per_key() {
        let rows = vec![
            aggregate(GeoKey::district("s", "x"), 1, 1800.0, 1),
            aggregate(GeoKey::district("s", "x"), 2, 1900.0, 3),
        ];
        let ranking = rank_regions(&rows, RankOrder::Descending, None);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].mean, 1875.0);
        assert_eq!(ranking[0].sample_count, 4);
        assert_eq!(ranking[0].state.as_deref(), Some("S"));
    }

    #[test]
    fn test_limit_and_ties() {
        let rows = vec![
            aggregate(GeoKey::state("c"), 1, 1900.0, 1),
            aggregate(GeoKey::state("a"), 1, 1900.0, 1),
            aggregate(GeoKey::state("b"), 1, 1900.0, 1),
        ];
        let ranking = rank_regions(&rows, RankOrder::Descending, Some(2));
        let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_regions(&[], RankOrder::Descending, None).is_empty());
    }
}
