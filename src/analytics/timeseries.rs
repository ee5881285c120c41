//! Monthly time-series analytics for a single district
//!
//! Builds the ordered monthly series, then derives descriptive statistics,
//! overall and per-year trends, the peak calendar month and a four-season
//! breakdown.

use crate::constants::precision;
use crate::model::MonthlyAggregate;
use crate::stats::trend::index_slope;
use crate::stats::{calculate_statistics, mean, round_to, TrendDirection};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar month of the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// First day of the month
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// Monthly mean
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub sample_count: usize,
}

/// Statistics of the monthly values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesStatistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std: f64,
    pub count: usize,
    /// std / mean * 100
    pub coefficient_of_variation: f64,
    pub trend_slope: f64,
}

/// Trend within one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTrend {
    pub year: i32,
    pub slope: f64,
    pub direction: TrendDirection,
    pub average: f64,
}

/// Overall and per-year trends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub overall_slope: f64,
    pub overall_direction: TrendDirection,
    /// Years with at least two months of data
    pub yearly_trends: Vec<YearlyTrend>,
}

/// Indian seasons used for the seasonal breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// March to May
    Spring,
    /// June to August
    Summer,
    /// September to November
    Monsoon,
    /// December to February
    Winter,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Monsoon,
            _ => Self::Winter,
        }
    }
}

/// Average of one season's monthly values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub average: f64,
    pub sample_count: usize,
}

/// Seasonal breakdown; seasons without data are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spring: Option<SeasonSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summer: Option<SeasonSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monsoon: Option<SeasonSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winter: Option<SeasonSummary>,
}

impl SeasonalPattern {
    pub fn get(&self, season: Season) -> Option<&SeasonSummary> {
        match season {
            Season::Spring => self.spring.as_ref(),
            Season::Summer => self.summer.as_ref(),
            Season::Monsoon => self.monsoon.as_ref(),
            Season::Winter => self.winter.as_ref(),
        }
    }

    fn slot(&mut self, season: Season) -> &mut Option<SeasonSummary> {
        match season {
            Season::Spring => &mut self.spring,
            Season::Summer => &mut self.summer,
            Season::Monsoon => &mut self.monsoon,
            Season::Winter => &mut self.winter,
        }
    }
}

/// Full time-series analytics bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    pub state: String,
    pub district: String,
    pub time_series: Vec<TimeSeriesPoint>,
    pub statistics: TimeSeriesStatistics,
    pub trends: TrendSummary,
    /// Calendar month (1-12) with the highest average across years
    pub peak_month: Option<u32>,
    pub seasonal_pattern: SeasonalPattern,
    pub generated_at: DateTime<Utc>,
}

/// Analyze a district's monthly aggregates
///
/// Returns None when there are no aggregates. Gaps between months are
/// kept as gaps; nothing is interpolated or zero-filled.
pub fn analyze_timeseries(
    state: &str,
    district: &str,
    aggregates: &[MonthlyAggregate],
) -> Option<TimeSeriesReport> {
    if aggregates.is_empty() {
        return None;
    }

    let mut rows: Vec<&MonthlyAggregate> = aggregates.iter().collect();
    rows.sort_by_key(|a| (a.year, a.month));

    let values: Vec<f64> = rows.iter().map(|a| a.mean).collect();
    let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);

    let time_series = rows
        .iter()
        .filter_map(|a| {
            Some(TimeSeriesPoint {
                date: a.year_month().first_day()?,
                year: a.year,
                month: a.month,
                value: r(a.mean),
                min: r(a.min),
                max: r(a.max),
                std: r(a.std),
                sample_count: a.count,
            })
        })
        .collect();

    let years_and_months: Vec<(i32, u32)> = rows.iter().map(|a| (a.year, a.month)).collect();

    Some(TimeSeriesReport {
        state: state.to_string(),
        district: district.to_string(),
        time_series,
        statistics: series_statistics(&values),
        trends: trend_summary(&years_and_months, &values),
        peak_month: peak_month(&years_and_months, &values),
        seasonal_pattern: seasonal_pattern(&years_and_months, &values),
        generated_at: Utc::now(),
    })
}

fn series_statistics(values: &[f64]) -> TimeSeriesStatistics {
    let stats = calculate_statistics(values);
    let cv = if stats.mean != 0.0 {
        stats.std / stats.mean * 100.0
    } else {
        0.0
    };
    let rounded = stats.rounded();

    TimeSeriesStatistics {
        mean: rounded.mean,
        min: rounded.min,
        max: rounded.max,
        median: rounded.median,
        std: rounded.std,
        count: stats.count,
        coefficient_of_variation: round_to(cv, precision::VALUE_DECIMALS),
        trend_slope: round_to(index_slope(values), precision::SLOPE_DECIMALS),
    }
}

fn trend_summary(periods: &[(i32, u32)], values: &[f64]) -> TrendSummary {
    let overall = index_slope(values);

    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for ((year, _), value) in periods.iter().zip(values) {
        by_year.entry(*year).or_default().push(*value);
    }

    let yearly_trends = by_year
        .into_iter()
        .filter(|(_, year_values)| year_values.len() >= 2)
        .map(|(year, year_values)| {
            let slope = index_slope(&year_values);
            YearlyTrend {
                year,
                slope: round_to(slope, precision::SLOPE_DECIMALS),
                direction: TrendDirection::from_slope(slope),
                average: round_to(mean(&year_values), precision::VALUE_DECIMALS),
            }
        })
        .collect();

    TrendSummary {
        overall_slope: round_to(overall, precision::SLOPE_DECIMALS),
        overall_direction: TrendDirection::from_slope(overall),
        yearly_trends,
    }
}

/// Month-of-year with the highest average; ties go to the earlier month
fn peak_month(periods: &[(i32, u32)], values: &[f64]) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;

    for month in 1..=12u32 {
        let month_values: Vec<f64> = periods
            .iter()
            .zip(values)
            .filter(|((_, m), _)| *m == month)
            .map(|(_, v)| *v)
            .collect();

        if month_values.is_empty() {
            continue;
        }

        let average = mean(&month_values);
        if best.map_or(true, |(_, best_average)| average > best_average) {
            best = Some((month, average));
        }
    }

    best.map(|(month, _)| month)
}

fn seasonal_pattern(periods: &[(i32, u32)], values: &[f64]) -> SeasonalPattern {
    let mut buckets: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for ((_, month), value) in periods.iter().zip(values) {
        buckets.entry(Season::from_month(*month)).or_default().push(*value);
    }

    let mut pattern = SeasonalPattern::default();
    for (season, season_values) in buckets {
        *pattern.slot(season) = Some(SeasonSummary {
            average: round_to(mean(&season_values), precision::VALUE_DECIMALS),
            sample_count: season_values.len(),
        });
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoKey;

    fn aggregate(year: i32, month: u32, mean: f64) -> MonthlyAggregate {
        MonthlyAggregate {
            key: GeoKey::district("a", "b"),
            year,
            month,
            mean,
            min: mean - 10.0,
            max: mean + 10.0,
            count: 4,
            std: 5.0,
        }
    }

    #[test]
    fn test_empty_series() {
        assert!(analyze_timeseries("A", "B", &[]).is_none());
    }

    #[test]
    fn test_increasing_three_months() {
        let rows = vec![
            aggregate(2020, 1, 1800.0),
            aggregate(2020, 2, 1900.0),
            aggregate(2020, 3, 2000.0),
        ];
        let report = analyze_timeseries("A", "B", &rows).unwrap();

        assert!(report.trends.overall_slope > 0.0);
        assert_eq!(report.trends.overall_slope, 100.0);
        assert_eq!(report.trends.overall_direction, TrendDirection::Increasing);
        assert_eq!(report.peak_month, Some(3));
        assert_eq!(report.statistics.trend_slope, 100.0);
        assert_eq!(report.statistics.mean, 1900.0);
        assert_eq!(report.statistics.count, 3);
    }

    #[test]
    fn test_series_is_ordered_and_gaps_kept() {
        let rows = vec![
            aggregate(2021, 2, 1900.0),
            aggregate(2020, 11, 1850.0),
            aggregate(2021, 5, 1950.0),
        ];
        let report = analyze_timeseries("A", "B", &rows).unwrap();

        let periods: Vec<(i32, u32)> = report
            .time_series
            .iter()
            .map(|p| (p.year, p.month))
            .collect();
        assert_eq!(periods, vec![(2020, 11), (2021, 2), (2021, 5)]);
        assert_eq!(
            report.time_series[0].date,
            NaiveDate::from_ymd_opt(2020, 11, 1).unwrap()
        );
        assert_eq!(report.time_series[0].sample_count, 4);
    }

    #[test]
    fn test_yearly_trends_skip_single_point_years() {
        let rows = vec![
            aggregate(2020, 1, 1900.0),
            aggregate(2020, 2, 1880.0),
            aggregate(2020, 3, 1860.0),
            aggregate(2021, 6, 1950.0),
        ];
        let report = analyze_timeseries("A", "B", &rows).unwrap();

        assert_eq!(report.trends.yearly_trends.len(), 1);
        let y2020 = &report.trends.yearly_trends[0];
        assert_eq!(y2020.year, 2020);
        assert_eq!(y2020.slope, -20.0);
        assert_eq!(y2020.direction, TrendDirection::Decreasing);
        assert_eq!(y2020.average, 1880.0);
    }

    #[test]
    fn test_single_point_is_stable() {
        let report = analyze_timeseries("A", "B", &[aggregate(2020, 4, 1850.0)]).unwrap();
        assert_eq!(report.trends.overall_slope, 0.0);
        assert_eq!(report.trends.overall_direction, TrendDirection::Stable);
        assert!(report.trends.yearly_trends.is_empty());
        assert_eq!(report.statistics.coefficient_of_variation, 0.0);
    }

    #[test]
    fn test_peak_month_averages_across_years() {
        let rows = vec![
            aggregate(2020, 1, 2000.0),
            aggregate(2021, 1, 1700.0),
            aggregate(2020, 7, 1900.0),
            aggregate(2021, 7, 1900.0),
        ];
        // January averages 1850, July 1900
        let report = analyze_timeseries("A", "B", &rows).unwrap();
        assert_eq!(report.peak_month, Some(7));
    }

    #[test]
    fn test_peak_month_tie_goes_to_first_month() {
        let rows = vec![aggregate(2020, 4, 1900.0), aggregate(2020, 9, 1900.0)];
        let report = analyze_timeseries("A", "B", &rows).unwrap();
        assert_eq!(report.peak_month, Some(4));
    }

    #[test]
    fn test_seasonal_buckets() {
        let rows = vec![
            aggregate(2020, 1, 1800.0),
            aggregate(2020, 2, 1820.0),
            aggregate(2020, 4, 1900.0),
            aggregate(2020, 10, 1950.0),
            aggregate(2020, 12, 1840.0),
        ];
        let report = analyze_timeseries("A", "B", &rows).unwrap();
        let pattern = &report.seasonal_pattern;

        let winter = pattern.get(Season::Winter).unwrap();
        assert_eq!(winter.sample_count, 3);
        assert_eq!(winter.average, 1820.0);
        assert_eq!(pattern.get(Season::Spring).unwrap().average, 1900.0);
        assert_eq!(pattern.get(Season::Monsoon).unwrap().sample_count, 1);
        assert!(pattern.summer.is_none());

        let json = serde_json::to_value(pattern).unwrap();
        assert!(json.get("summer").is_none());
        assert!(json.get("winter").is_some());
    }

    #[test]
    fn test_coefficient_of_variation() {
        let rows = vec![aggregate(2020, 1, 1800.0), aggregate(2020, 2, 2000.0)];
        let report = analyze_timeseries("A", "B", &rows).unwrap();
        // std 100, mean 1900
        assert_eq!(report.statistics.std, 100.0);
        assert_eq!(report.statistics.coefficient_of_variation, 5.26);
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Monsoon);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
    }
}
