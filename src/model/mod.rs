//! Emission data model
//!
//! Immutable value objects produced by querying the data store:
//! - Geographic keys at nation, state and district level
//! - Time periods (whole history, a year, or a single month)
//! - Raw point samples and per-month aggregates

use crate::constants::{emission, geo};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Level of the geographic hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    Nation,
    State,
    District,
}

/// A geographic key. Names are always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum GeoKey {
    Nation,
    State { state: String },
    District { state: String, district: String },
}

/// Upper-case and trim a geographic name for lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

impl GeoKey {
    /// Key for a whole state
    pub fn state(state: &str) -> Self {
        Self::State {
            state: normalize_name(state),
        }
    }

    /// Key for a district within a state
    pub fn district(state: &str, district: &str) -> Self {
        Self::District {
            state: normalize_name(state),
            district: normalize_name(district),
        }
    }

    pub fn level(&self) -> GeoLevel {
        match self {
            Self::Nation => GeoLevel::Nation,
            Self::State { .. } => GeoLevel::State,
            Self::District { .. } => GeoLevel::District,
        }
    }

    /// Display name of the most specific level of this key
    pub fn name(&self) -> &str {
        match self {
            Self::Nation => geo::NATION_NAME,
            Self::State { state } => state,
            Self::District { district, .. } => district,
        }
    }

    /// State name, if this key is below nation level
    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::Nation => None,
            Self::State { state } | Self::District { state, .. } => Some(state),
        }
    }

    /// Truncate this key to a coarser level
    ///
    /// Returns None if `level` is finer than the key itself.
    pub fn at_level(&self, level: GeoLevel) -> Option<GeoKey> {
        match (self, level) {
            (_, GeoLevel::Nation) => Some(Self::Nation),
            (Self::State { state }, GeoLevel::State)
            | (Self::District { state, .. }, GeoLevel::State) => Some(Self::State {
                state: state.clone(),
            }),
            (Self::District { .. }, GeoLevel::District) => Some(self.clone()),
            _ => None,
        }
    }

    /// Whether `other` lies inside (or equals) this key
    pub fn contains(&self, other: &GeoKey) -> bool {
        other.at_level(self.level()).as_ref() == Some(self)
    }
}

impl std::fmt::Display for GeoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nation => write!(f, "{}", geo::NATION_NAME),
            Self::State { state } => write!(f, "{}", state),
            Self::District { state, district } => write!(f, "{}, {}", district, state),
        }
    }
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a validated year/month pair
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidPeriod(format!(
                "Month {} is out of range [1, 12]",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Period key in `YYYY-MM` form
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// First day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Time scope of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Period {
    All,
    Year { year: i32 },
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn month(ym: YearMonth) -> Self {
        Self::Month {
            year: ym.year,
            month: ym.month,
        }
    }

    pub fn contains(&self, year: i32, month: u32) -> bool {
        match *self {
            Self::All => true,
            Self::Year { year: y } => y == year,
            Self::Month { year: y, month: m } => y == year && m == month,
        }
    }
}

/// A single point measurement of methane concentration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Concentration in ppb
    pub value: f64,
    pub date: NaiveDate,
}

impl EmissionSample {
    pub fn new(latitude: f64, longitude: f64, value: f64, date: NaiveDate) -> Self {
        Self {
            latitude,
            longitude,
            value,
            date,
        }
    }

    /// Validate coordinates against the India bounding box and the value range
    pub fn validate(&self) -> Result<()> {
        if !(geo::MIN_LATITUDE..=geo::MAX_LATITUDE).contains(&self.latitude) {
            return Err(Error::InvalidSample(format!(
                "Latitude {} is out of range [{}, {}]",
                self.latitude,
                geo::MIN_LATITUDE,
                geo::MAX_LATITUDE
            )));
        }
        if !(geo::MIN_LONGITUDE..=geo::MAX_LONGITUDE).contains(&self.longitude) {
            return Err(Error::InvalidSample(format!(
                "Longitude {} is out of range [{}, {}]",
                self.longitude,
                geo::MIN_LONGITUDE,
                geo::MAX_LONGITUDE
            )));
        }
        if !(self.value > emission::MIN_VALUE && self.value < emission::MAX_VALUE) {
            return Err(Error::InvalidSample(format!(
                "Emission value {} is out of range ({}, {})",
                self.value,
                emission::MIN_VALUE,
                emission::MAX_VALUE
            )));
        }
        Ok(())
    }
}

/// Per-month aggregate of the samples of one geography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub key: GeoKey,
    pub year: i32,
    pub month: u32,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Population standard deviation
    pub std: f64,
}

impl MonthlyAggregate {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Pooled summary of several aggregates of the same geography
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub std: f64,
}

/// Pool monthly aggregates into one summary, weighting by sample count
///
/// Exact for population statistics: the pooled second moment is the
/// count-weighted mean of `std^2 + mean^2`. Returns None when the
/// aggregates hold no samples.
pub fn pool_aggregates<'a, I>(aggregates: I) -> Option<PooledSummary>
where
    I: IntoIterator<Item = &'a MonthlyAggregate>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for agg in aggregates {
        if agg.count == 0 {
            continue;
        }
        let n = agg.count as f64;
        count += agg.count;
        sum += agg.mean * n;
        sum_sq += (agg.std * agg.std + agg.mean * agg.mean) * n;
        min = min.min(agg.min);
        max = max.max(agg.max);
    }

    if count == 0 {
        return None;
    }

    let n = count as f64;
    let mean = sum / n;
    // Clamp tiny negative variances from cancellation
    let variance = (sum_sq / n - mean * mean).max(0.0);

    Some(PooledSummary {
        mean,
        min,
        max,
        count,
        std: variance.sqrt(),
    })
}

/// Latitude/longitude bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Tight bounds around a set of samples, None if empty
    pub fn enclosing(samples: &[EmissionSample]) -> Option<Self> {
        let first = samples.first()?;
        let mut bounds = Self::new(
            first.latitude,
            first.latitude,
            first.longitude,
            first.longitude,
        );
        for s in &samples[1..] {
            bounds.min_lat = bounds.min_lat.min(s.latitude);
            bounds.max_lat = bounds.max_lat.max(s.latitude);
            bounds.min_lon = bounds.min_lon.min(s.longitude);
            bounds.max_lon = bounds.max_lon.max(s.longitude);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregate(mean: f64, std: f64, count: usize) -> MonthlyAggregate {
        MonthlyAggregate {
            key: GeoKey::state("a"),
            year: 2020,
            month: 1,
            mean,
            min: mean - std,
            max: mean + std,
            count,
            std,
        }
    }

    #[test]
    fn test_names_are_normalized() {
        let key = GeoKey::district(" kerala ", "Thrissur");
        assert_eq!(
            key,
            GeoKey::District {
                state: "KERALA".to_string(),
                district: "THRISSUR".to_string()
            }
        );
        assert_eq!(key.name(), "THRISSUR");
        assert_eq!(key.state_name(), Some("KERALA"));
        assert_eq!(key.to_string(), "THRISSUR, KERALA");
    }

    #[test]
    fn test_key_containment() {
        let state = GeoKey::state("kerala");
        let district = GeoKey::district("kerala", "thrissur");
        let other = GeoKey::district("goa", "north goa");

        assert!(GeoKey::Nation.contains(&district));
        assert!(state.contains(&district));
        assert!(state.contains(&state));
        assert!(!state.contains(&other));
        assert!(!district.contains(&state));
    }

    #[test]
    fn test_at_level() {
        let district = GeoKey::district("kerala", "thrissur");
        assert_eq!(district.at_level(GeoLevel::State), Some(GeoKey::state("kerala")));
        assert_eq!(district.at_level(GeoLevel::Nation), Some(GeoKey::Nation));
        assert_eq!(GeoKey::state("kerala").at_level(GeoLevel::District), None);
    }

    #[test]
    fn test_year_month() {
        let ym = YearMonth::new(2021, 3).unwrap();
        assert_eq!(ym.key(), "2021-03");
        assert_eq!(ym.first_day(), Some(date(2021, 3, 1)));
        assert!(YearMonth::new(2021, 0).is_err());
        assert!(YearMonth::new(2021, 13).is_err());
    }

    #[test]
    fn test_period_contains() {
        assert!(Period::All.contains(1999, 7));
        assert!(Period::Year { year: 2020 }.contains(2020, 12));
        assert!(!Period::Year { year: 2020 }.contains(2021, 1));
        assert!(Period::Month { year: 2020, month: 5 }.contains(2020, 5));
        assert!(!Period::Month { year: 2020, month: 5 }.contains(2020, 6));
    }

    #[test]
    fn test_sample_validation() {
        assert!(EmissionSample::new(10.5, 76.2, 1890.0, date(2020, 1, 1))
            .validate()
            .is_ok());
        // Outside India
        assert!(EmissionSample::new(40.7, -74.0, 1890.0, date(2020, 1, 1))
            .validate()
            .is_err());
        assert!(EmissionSample::new(10.5, 100.0, 1890.0, date(2020, 1, 1))
            .validate()
            .is_err());
        // Value out of range
        assert!(EmissionSample::new(10.5, 76.2, 0.0, date(2020, 1, 1))
            .validate()
            .is_err());
        assert!(EmissionSample::new(10.5, 76.2, 10_000.0, date(2020, 1, 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_pool_aggregates_matches_raw_statistics() {
        // Raw samples: [1, 3] and [5, 7, 9]
        let a = aggregate(2.0, 1.0, 2);
        let b = aggregate(7.0, (8.0f64 / 3.0).sqrt(), 3);

        let pooled = pool_aggregates([&a, &b]).unwrap();
        assert_eq!(pooled.count, 5);
        assert_relative_eq!(pooled.mean, 5.0, epsilon = 1e-9);
        // Population std of [1,3,5,7,9] = sqrt(8)
        assert_relative_eq!(pooled.std, 8.0f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_pool_aggregates_empty() {
        assert!(pool_aggregates(std::iter::empty()).is_none());
        assert!(pool_aggregates([&aggregate(1.0, 0.0, 0)]).is_none());
    }

    #[test]
    fn test_bounds_enclosing() {
        let samples = vec![
            EmissionSample::new(10.0, 76.0, 1800.0, date(2020, 1, 1)),
            EmissionSample::new(11.0, 75.0, 1800.0, date(2020, 1, 1)),
            EmissionSample::new(10.5, 77.0, 1800.0, date(2020, 1, 1)),
        ];
        let bounds = Bounds::enclosing(&samples).unwrap();
        assert_eq!(bounds, Bounds::new(10.0, 11.0, 75.0, 77.0));
        assert!(Bounds::enclosing(&[]).is_none());
    }
}
