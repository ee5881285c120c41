//! Emission analytics
//!
//! [`AnalyticsService`] is the entry point used by the HTTP API and the
//! CLI. It reads from an [`EmissionRepository`] and hands the rows to the
//! pure analyzers in the submodules:
//!
//! - `timeseries`: trend, peak month and seasonal profile of a district
//! - `clustering`: k-means grouping of a state's districts
//! - `correlation`: pairwise correlation of district series
//! - `ranking`: states and districts ordered by mean emission
//! - `extremes`: samples above a percentile threshold
//! - `snapshot`: per-region map views and district surfaces
//!
//! Missing data is reported through [`AnalysisOutcome`], never as an error.
//! Only store failures and invalid input propagate as [`Error`].

pub mod clustering;
pub mod correlation;
pub mod extremes;
pub mod ranking;
pub mod snapshot;
pub mod timeseries;

pub use clustering::{cluster_districts, ClusteringReport, DistrictAverage};
pub use correlation::{correlate_districts, CorrelationReport};
pub use extremes::{detect_extremes, ExtremeEventsReport};
pub use ranking::{rank_regions, RankOrder, RankingReport};
pub use snapshot::{DistrictSurface, Metadata, RegionSnapshot};
pub use timeseries::{analyze_timeseries, TimeSeriesReport};

use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use crate::model::{pool_aggregates, GeoKey, GeoLevel, MonthlyAggregate, Period, YearMonth};
use crate::store::EmissionRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an analysis that may lack data
///
/// Serialized with a `status` tag; a ready payload's fields sit next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome<T> {
    Ready(T),
    /// The geography or period holds no samples
    NoData { message: String },
    /// Samples exist but too few for this analysis
    InsufficientData { message: String },
}

impl<T> AnalysisOutcome<T> {
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The payload, if ready
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AnalysisOutcome<U> {
        match self {
            Self::Ready(value) => AnalysisOutcome::Ready(f(value)),
            Self::NoData { message } => AnalysisOutcome::NoData { message },
            Self::InsufficientData { message } => AnalysisOutcome::InsufficientData { message },
        }
    }
}

/// Analytics over an emission repository
///
/// Holds no mutable state; every call reads the repository once and
/// computes its result from scratch.
pub struct AnalyticsService<R: ?Sized = dyn EmissionRepository> {
    repo: Arc<R>,
    config: AnalyticsConfig,
}

impl<R: EmissionRepository + ?Sized> AnalyticsService<R> {
    pub fn new(repo: Arc<R>, config: AnalyticsConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Time-series analytics of one district over its whole history
    pub fn get_timeseries(
        &self,
        state: &str,
        district: &str,
    ) -> Result<AnalysisOutcome<TimeSeriesReport>> {
        let key = GeoKey::district(state, district);
        let rows = self
            .repo
            .fetch_monthly_aggregates(&key, GeoLevel::District, &Period::All)?;
        debug!("Time series for {}: {} months", key, rows.len());

        let state = key.state_name().unwrap_or_default();
        Ok(match analyze_timeseries(state, key.name(), &rows) {
            Some(report) => AnalysisOutcome::Ready(report),
            None => AnalysisOutcome::no_data(format!("No time series data for {}", key)),
        })
    }

    /// Cluster the districts of a state by their average emission
    ///
    /// Needs at least two districts with data.
    pub fn get_clustering(&self, state: &str) -> Result<AnalysisOutcome<ClusteringReport>> {
        let key = GeoKey::state(state);
        let rows = self
            .repo
            .fetch_monthly_aggregates(&key, GeoLevel::District, &Period::All)?;

        let mut averages = district_averages(&rows);
        averages.sort_by(|a, b| b.average.total_cmp(&a.average));

        match averages.len() {
            0 => Ok(AnalysisOutcome::no_data(format!(
                "No district data for {}",
                key
            ))),
            1 => Ok(AnalysisOutcome::insufficient(format!(
                "Clustering needs at least 2 districts with data in {}, found 1",
                key
            ))),
            n => {
                info!("Clustering {} districts of {}", n, key);
                cluster_districts(key.name(), &averages).map(AnalysisOutcome::Ready)
            }
        }
    }

    /// Rank states and districts for a month
    ///
    /// Always returns a report; lists are empty when the month has no data.
    pub fn get_ranking(&self, year: i32, month: u32) -> Result<RankingReport> {
        let ym = YearMonth::new(year, month)?;
        let period = Period::month(ym);

        let states = self
            .repo
            .fetch_monthly_aggregates(&GeoKey::Nation, GeoLevel::State, &period)?;
        let districts = self
            .repo
            .fetch_monthly_aggregates(&GeoKey::Nation, GeoLevel::District, &period)?;

        let state_rankings = rank_regions(&states, RankOrder::Descending, None);
        let district_rankings = rank_regions(
            &districts,
            RankOrder::Descending,
            Some(self.config.district_ranking_limit),
        );
        debug!(
            "Ranked {} states and {} districts for {}",
            state_rankings.len(),
            district_rankings.len(),
            ym
        );

        Ok(RankingReport {
            period: ym.key(),
            total_states: state_rankings.len(),
            total_districts: district_rankings.len(),
            state_rankings,
            district_rankings,
            generated_at: Utc::now(),
        })
    }

    /// Correlate the monthly series of every district pair in a state
    pub fn get_correlation(&self, state: &str) -> Result<AnalysisOutcome<CorrelationReport>> {
        let key = GeoKey::state(state);
        let rows = self
            .repo
            .fetch_monthly_aggregates(&key, GeoLevel::District, &Period::All)?;

        let mut series: BTreeMap<String, correlation::PeriodSeries> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.count > 0) {
            series
                .entry(row.key.name().to_string())
                .or_default()
                .insert(row.year_month().key(), row.mean);
        }

        if series.is_empty() {
            return Ok(AnalysisOutcome::no_data(format!(
                "No district data for {}",
                key
            )));
        }

        Ok(AnalysisOutcome::Ready(correlate_districts(
            key.name(),
            &series,
            self.config.top_correlations,
        )))
    }

    /// Samples of a district above a percentile threshold
    ///
    /// `percentile` defaults to the configured threshold.
    pub fn get_extreme_events(
        &self,
        state: &str,
        district: &str,
        percentile: Option<f64>,
    ) -> Result<AnalysisOutcome<ExtremeEventsReport>> {
        let percentile = percentile.unwrap_or(self.config.extreme_threshold_percentile);
        let key = GeoKey::district(state, district);
        let samples = self.repo.fetch_samples(&key, &Period::All)?;

        let Some(detection) = detect_extremes(&samples, percentile)? else {
            return Ok(AnalysisOutcome::no_data(format!("No samples for {}", key)));
        };

        Ok(AnalysisOutcome::Ready(ExtremeEventsReport {
            state: key.state_name().unwrap_or_default().to_string(),
            district: key.name().to_string(),
            extreme_events: detection.events,
            statistics: detection.statistics,
            generated_at: Utc::now(),
        }))
    }

    /// Per-region means of the nation (by state) or a state (by district)
    ///
    /// # Errors
    /// [`Error::Precondition`] for a district scope.
    pub fn get_region_snapshot(
        &self,
        scope: &GeoKey,
        year: i32,
        month: u32,
    ) -> Result<AnalysisOutcome<RegionSnapshot>> {
        let ym = YearMonth::new(year, month)?;
        let region_level = match scope.level() {
            GeoLevel::Nation => GeoLevel::State,
            GeoLevel::State => GeoLevel::District,
            GeoLevel::District => {
                return Err(Error::Precondition(format!(
                    "Region snapshot needs a nation or state scope, got {}",
                    scope
                )))
            }
        };

        let rows = self
            .repo
            .fetch_monthly_aggregates(scope, region_level, &Period::month(ym))?;

        Ok(
            match snapshot::region_snapshot(scope, region_level, &ym.key(), &rows) {
                Some(snapshot) => AnalysisOutcome::Ready(snapshot),
                None => AnalysisOutcome::no_data(format!("No data for {} in {}", scope, ym)),
            },
        )
    }

    /// Raw points of a district for a month, interpolated when possible
    pub fn get_district_surface(
        &self,
        state: &str,
        district: &str,
        year: i32,
        month: u32,
    ) -> Result<AnalysisOutcome<DistrictSurface>> {
        let ym = YearMonth::new(year, month)?;
        let key = GeoKey::district(state, district);
        let samples = self.repo.fetch_samples(&key, &Period::month(ym))?;

        Ok(match snapshot::district_surface(&key, &ym.key(), &samples) {
            Some(surface) => AnalysisOutcome::Ready(surface),
            None => AnalysisOutcome::no_data(format!("No data for {} in {}", key, ym)),
        })
    }

    /// Years, states and districts present in the store
    pub fn get_metadata(&self) -> Result<Metadata> {
        let periods = self.repo.available_periods()?;
        let years: BTreeSet<i32> = periods.iter().map(|p| p.year).collect();
        let states = self.repo.states()?;

        let mut district_map = BTreeMap::new();
        for state in &states {
            district_map.insert(state.clone(), self.repo.districts(state)?);
        }

        Ok(Metadata {
            min_year: years.first().copied(),
            max_year: years.last().copied(),
            years: years.into_iter().rev().collect(),
            total_states: states.len(),
            states,
            district_map,
            api_version: snapshot::API_VERSION.to_string(),
            generated_at: Utc::now(),
        })
    }
}

/// Pool monthly district rows into one average per district
fn district_averages(rows: &[MonthlyAggregate]) -> Vec<DistrictAverage> {
    let mut by_key: BTreeMap<&GeoKey, Vec<&MonthlyAggregate>> = BTreeMap::new();
    for row in rows {
        by_key.entry(&row.key).or_default().push(row);
    }

    by_key
        .into_iter()
        .filter_map(|(key, group)| {
            pool_aggregates(group).map(|s| DistrictAverage {
                district: key.name().to_string(),
                average: s.mean,
                std: s.std,
                sample_count: s.count,
            })
        })
        .collect()
}
