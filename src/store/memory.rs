//! In-memory emission store
//!
//! Holds validated raw samples tagged with their district and aggregates
//! them on demand. Datasets are loaded from and saved to a JSON file:
//!
//! ```json
//! {"samples": [{"state": "KERALA", "district": "THRISSUR",
//!               "latitude": 10.5, "longitude": 76.2,
//!               "value": 1890.4, "date": "2021-03-14"}]}
//! ```

use crate::error::{Error, Result};
use crate::model::{
    normalize_name, EmissionSample, GeoKey, GeoLevel, MonthlyAggregate, Period, YearMonth,
};
use crate::stats::calculate_statistics;
use crate::store::EmissionRepository;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// One sample as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub state: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    pub date: NaiveDate,
}

impl SampleRecord {
    fn sample(&self) -> EmissionSample {
        EmissionSample::new(self.latitude, self.longitude, self.value, self.date)
    }
}

/// On-disk dataset
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SampleFile {
    #[serde(default)]
    pub samples: Vec<SampleRecord>,
}

/// A sample with the district it belongs to
#[derive(Debug, Clone)]
struct Entry {
    key: GeoKey,
    sample: EmissionSample,
}

/// In-memory store of district-tagged samples
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Vec<Entry>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample for a district
    ///
    /// Names are upper-cased. Samples outside the India bounding box or
    /// the plausible value range are rejected.
    pub fn insert(&mut self, state: &str, district: &str, sample: EmissionSample) -> Result<()> {
        sample.validate()?;
        self.entries.push(Entry {
            key: GeoKey::district(state, district),
            sample,
        });
        Ok(())
    }

    /// Build a store from records, skipping invalid ones
    ///
    /// Returns the store and the number of rejected records.
    pub fn from_records(records: &[SampleRecord]) -> (Self, usize) {
        let mut store = Self::new();
        let mut rejected = 0;

        for record in records {
            if let Err(e) = store.insert(&record.state, &record.district, record.sample()) {
                warn!(
                    "Skipping sample for {}, {} on {}: {}",
                    record.district, record.state, record.date, e
                );
                rejected += 1;
            }
        }

        (store, rejected)
    }

    /// Load a dataset from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Store(format!("Failed to read data file {}: {}", path.display(), e))
        })?;

        let file: SampleFile = serde_json::from_str(&content).map_err(|e| {
            Error::Store(format!("Failed to parse data file {}: {}", path.display(), e))
        })?;

        let (store, rejected) = Self::from_records(&file.samples);
        info!(
            "Loaded {} samples from {} ({} rejected)",
            store.len(),
            path.display(),
            rejected
        );

        Ok(store)
    }

    /// Save the dataset to a JSON file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!("Failed to create data directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&SampleFile {
            samples: self.records(),
        })?;

        fs::write(path, content)
            .map_err(|e| Error::Store(format!("Failed to write data file: {}", e)))?;

        Ok(())
    }

    /// All samples as on-disk records
    pub fn records(&self) -> Vec<SampleRecord> {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.key {
                GeoKey::District { state, district } => Some(SampleRecord {
                    state: state.clone(),
                    district: district.clone(),
                    latitude: entry.sample.latitude,
                    longitude: entry.sample.longitude,
                    value: entry.sample.value,
                    date: entry.sample.date,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matching<'a>(
        &'a self,
        scope: &'a GeoKey,
        period: &'a Period,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |entry| {
            scope.contains(&entry.key)
                && period.contains(entry.sample.date.year(), entry.sample.date.month())
        })
    }
}

impl EmissionRepository for InMemoryStore {
    fn fetch_monthly_aggregates(
        &self,
        scope: &GeoKey,
        group_by: GeoLevel,
        period: &Period,
    ) -> Result<Vec<MonthlyAggregate>> {
        let mut groups: BTreeMap<(GeoKey, YearMonth), Vec<f64>> = BTreeMap::new();

        for entry in self.matching(scope, period) {
            let Some(key) = entry.key.at_level(group_by) else {
                continue;
            };
            let ym = YearMonth {
                year: entry.sample.date.year(),
                month: entry.sample.date.month(),
            };
            groups.entry((key, ym)).or_default().push(entry.sample.value);
        }

        let aggregates: Vec<MonthlyAggregate> = groups
            .into_iter()
            .map(|((key, ym), values)| {
                let stats = calculate_statistics(&values);
                MonthlyAggregate {
                    key,
                    year: ym.year,
                    month: ym.month,
                    mean: stats.mean,
                    min: stats.min,
                    max: stats.max,
                    count: stats.count,
                    std: stats.std,
                }
            })
            .collect();

        debug!(
            "Aggregated {} monthly rows for {} by {:?}",
            aggregates.len(),
            scope,
            group_by
        );

        Ok(aggregates)
    }

    fn fetch_samples(&self, scope: &GeoKey, period: &Period) -> Result<Vec<EmissionSample>> {
        Ok(self.matching(scope, period).map(|e| e.sample).collect())
    }

    fn states(&self) -> Result<Vec<String>> {
        let states: BTreeSet<&str> = self
            .entries
            .iter()
            .filter_map(|e| e.key.state_name())
            .collect();
        Ok(states.into_iter().map(str::to_string).collect())
    }

    fn districts(&self, state: &str) -> Result<Vec<String>> {
        let state = normalize_name(state);
        let districts: BTreeSet<&str> = self
            .entries
            .iter()
            .filter_map(|e| match &e.key {
                GeoKey::District { state: s, district } if *s == state => Some(district.as_str()),
                _ => None,
            })
            .collect();
        Ok(districts.into_iter().map(str::to_string).collect())
    }

    fn available_periods(&self) -> Result<Vec<YearMonth>> {
        let periods: BTreeSet<YearMonth> = self
            .entries
            .iter()
            .map(|e| YearMonth {
                year: e.sample.date.year(),
                month: e.sample.date.month(),
            })
            .collect();
        Ok(periods.into_iter().rev().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store
            .insert("kerala", "thrissur", EmissionSample::new(10.5, 76.2, 1800.0, date(2020, 1, 3)))
            .unwrap();
        store
            .insert("Kerala", "Thrissur", EmissionSample::new(10.6, 76.3, 1900.0, date(2020, 1, 20)))
            .unwrap();
        store
            .insert("KERALA", "ERNAKULAM", EmissionSample::new(10.0, 76.3, 1950.0, date(2020, 1, 9)))
            .unwrap();
        store
            .insert("kerala", "thrissur", EmissionSample::new(10.5, 76.2, 2000.0, date(2020, 2, 1)))
            .unwrap();
        store
            .insert("goa", "north goa", EmissionSample::new(15.5, 73.9, 1850.0, date(2020, 1, 5)))
            .unwrap();
        store
    }

    #[test]
    fn test_insert_rejects_invalid_samples() {
        let mut store = InMemoryStore::new();
        let result = store.insert("a", "b", EmissionSample::new(51.5, -0.1, 1800.0, date(2020, 1, 1)));
        assert!(matches!(result, Err(Error::InvalidSample(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_district_aggregates() {
        let store = create_test_store();
        let rows = store
            .fetch_monthly_aggregates(
                &GeoKey::district("kerala", "thrissur"),
                GeoLevel::District,
                &Period::All,
            )
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year, rows[0].month), (2020, 1));
        assert_relative_eq!(rows[0].mean, 1850.0);
        assert_relative_eq!(rows[0].std, 50.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].min, 1800.0);
        assert_eq!(rows[0].max, 1900.0);
        assert_eq!((rows[1].year, rows[1].month), (2020, 2));
    }

    #[test]
    fn test_state_aggregates_for_period() {
        let store = create_test_store();
        let rows = store
            .fetch_monthly_aggregates(
                &GeoKey::Nation,
                GeoLevel::State,
                &Period::Month { year: 2020, month: 1 },
            )
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, GeoKey::state("goa"));
        assert_eq!(rows[1].key, GeoKey::state("kerala"));
        assert_eq!(rows[1].count, 3);
        assert_relative_eq!(rows[1].mean, 1883.333333333, epsilon = 1e-6);
    }

    #[test]
    fn test_districts_grouped_within_state() {
        let store = create_test_store();
        let rows = store
            .fetch_monthly_aggregates(&GeoKey::state("kerala"), GeoLevel::District, &Period::All)
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.key.name()).collect();
        assert_eq!(names, vec!["ERNAKULAM", "THRISSUR", "THRISSUR"]);
    }

    #[test]
    fn test_fetch_samples() {
        let store = create_test_store();
        let samples = store
            .fetch_samples(
                &GeoKey::district("kerala", "thrissur"),
                &Period::Month { year: 2020, month: 1 },
            )
            .unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_metadata_queries() {
        let store = create_test_store();
        assert_eq!(store.states().unwrap(), vec!["GOA", "KERALA"]);
        assert_eq!(store.districts("kerala").unwrap(), vec!["ERNAKULAM", "THRISSUR"]);
        assert!(store.districts("bihar").unwrap().is_empty());

        let periods = store.available_periods().unwrap();
        assert_eq!(periods[0], YearMonth { year: 2020, month: 2 });
        assert_eq!(periods.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("samples.json");

        let store = create_test_store();
        store.save_to(&path).unwrap();

        let loaded = InMemoryStore::load_from(&path).unwrap();
        assert_eq!(loaded.len(), store.len());
        assert_eq!(loaded.states().unwrap(), store.states().unwrap());
    }

    #[test]
    fn test_load_skips_invalid_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("samples.json");
        let json = serde_json::json!({
            "samples": [
                {"state": "kerala", "district": "thrissur", "latitude": 10.5,
                 "longitude": 76.2, "value": 1890.0, "date": "2021-03-14"},
                {"state": "kerala", "district": "thrissur", "latitude": 10.5,
                 "longitude": 76.2, "value": -3.0, "date": "2021-03-15"}
            ]
        });
        fs::write(&path, json.to_string()).unwrap();

        let store = InMemoryStore::load_from(&path).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = InMemoryStore::load_from(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Store(_))));
    }
}
