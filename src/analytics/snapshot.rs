//! Map views: region snapshots, district surfaces and dataset metadata

use crate::constants::precision;
use crate::error::Error;
use crate::model::{pool_aggregates, Bounds, EmissionSample, GeoKey, GeoLevel, MonthlyAggregate};
use crate::spatial::{interpolate_grid, InterpolatedGrid, SpatialPoint};
use crate::stats::{calculate_statistics, round_to, Statistics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of regions listed as top emitters
pub const TOP_REGIONS: usize = 5;

/// Version reported by [`Metadata`]
pub const API_VERSION: &str = "1.0";

/// Mean emission of one region for a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionValue {
    pub name: String,
    pub mean: f64,
    pub sample_count: usize,
}

/// A top-emitting region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRegion {
    pub name: String,
    pub methane_ppb: f64,
}

/// Per-region means of a nation or state for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    /// `INDIA` or the state name
    pub scope: String,
    /// Level of the listed regions (state for the nation, district for a state)
    pub region_level: GeoLevel,
    pub period: String,
    pub statistics: Statistics,
    pub top_regions: Vec<TopRegion>,
    pub regions: Vec<RegionValue>,
    pub generated_at: DateTime<Utc>,
}

/// Build a snapshot from monthly aggregates of the child regions
///
/// Statistics and the top list only consider strictly positive means.
/// Returns None when no region holds samples.
pub fn region_snapshot(
    scope: &GeoKey,
    region_level: GeoLevel,
    period: &str,
    aggregates: &[MonthlyAggregate],
) -> Option<RegionSnapshot> {
    let mut by_key: BTreeMap<&GeoKey, Vec<&MonthlyAggregate>> = BTreeMap::new();
    for agg in aggregates {
        by_key.entry(&agg.key).or_default().push(agg);
    }

    let regions: Vec<RegionValue> = by_key
        .into_iter()
        .filter_map(|(key, rows)| {
            pool_aggregates(rows).map(|s| RegionValue {
                name: key.name().to_string(),
                mean: s.mean,
                sample_count: s.count,
            })
        })
        .collect();

    if regions.is_empty() {
        return None;
    }

    let positive: Vec<f64> = regions.iter().map(|r| r.mean).filter(|v| *v > 0.0).collect();
    let statistics = calculate_statistics(&positive).rounded();

    let mut ranked: Vec<&RegionValue> = regions.iter().filter(|r| r.mean > 0.0).collect();
    ranked.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    let top_regions = ranked
        .into_iter()
        .take(TOP_REGIONS)
        .map(|r| TopRegion {
            name: r.name.clone(),
            methane_ppb: round_to(r.mean, precision::VALUE_DECIMALS),
        })
        .collect();

    let regions = regions
        .into_iter()
        .map(|r| RegionValue {
            mean: round_to(r.mean, precision::VALUE_DECIMALS),
            ..r
        })
        .collect();

    Some(RegionSnapshot {
        scope: scope.name().to_string(),
        region_level,
        period: period.to_string(),
        statistics,
        top_regions,
        regions,
        generated_at: Utc::now(),
    })
}

/// How a district surface can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// An IDW grid is available
    InterpolatedContour,
    /// Too few points to interpolate; draw the raw points
    PointsOnly,
}

/// Raw points of a district for a month, optionally with an IDW grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictSurface {
    #[serde(rename = "type")]
    pub kind: SurfaceKind,
    pub state: String,
    pub district: String,
    pub period: String,
    pub points: Vec<SpatialPoint>,
    pub bounds: Bounds,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<InterpolatedGrid>,
    pub generated_at: DateTime<Utc>,
}

/// Build the surface of a district's samples
///
/// Returns None when there are no samples. Interpolation runs over the
/// tight bounds of the points; when it is not possible the surface falls
/// back to [`SurfaceKind::PointsOnly`].
pub fn district_surface(
    key: &GeoKey,
    period: &str,
    samples: &[EmissionSample],
) -> Option<DistrictSurface> {
    let bounds = Bounds::enclosing(samples)?;
    let points: Vec<SpatialPoint> = samples.iter().map(SpatialPoint::from).collect();
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

    let grid = match interpolate_grid(&points, &bounds) {
        Ok(grid) => Some(grid.rounded()),
        Err(Error::InsufficientPoints { .. }) => None,
        Err(e) => {
            tracing::warn!("Interpolation failed for {}: {}", key, e);
            None
        }
    };

    let kind = if grid.is_some() {
        SurfaceKind::InterpolatedContour
    } else {
        SurfaceKind::PointsOnly
    };

    Some(DistrictSurface {
        kind,
        state: key.state_name().unwrap_or_default().to_string(),
        district: key.name().to_string(),
        period: period.to_string(),
        points,
        bounds,
        statistics: calculate_statistics(&values).rounded(),
        grid,
        generated_at: Utc::now(),
    })
}

/// What the dataset covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Years with data, most recent first
    pub years: Vec<i32>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub total_states: usize,
    pub states: Vec<String>,
    pub district_map: BTreeMap<String, Vec<String>>,
    pub api_version: String,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn aggregate(key: GeoKey, mean: f64, count: usize) -> MonthlyAggregate {
        MonthlyAggregate {
            key,
            year: 2021,
            month: 6,
            mean,
            min: mean,
            max: mean,
            count,
            std: 0.0,
        }
    }

    fn sample(lat: f64, lon: f64, value: f64) -> EmissionSample {
        EmissionSample::new(lat, lon, value, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap())
    }

    #[test]
    fn test_region_snapshot() {
        let rows: Vec<MonthlyAggregate> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .enumerate()
            .map(|(i, s)| aggregate(GeoKey::state(s), 1800.0 + i as f64 * 10.0, 3))
            .collect();

        let snapshot =
            region_snapshot(&GeoKey::Nation, GeoLevel::State, "2021-06", &rows).unwrap();

        assert_eq!(snapshot.scope, "INDIA");
        assert_eq!(snapshot.regions.len(), 6);
        assert_eq!(snapshot.statistics.count, 6);
        assert_eq!(snapshot.statistics.max, 1850.0);
        assert_eq!(snapshot.top_regions.len(), TOP_REGIONS);
        assert_eq!(snapshot.top_regions[0].name, "F");
        assert_eq!(snapshot.top_regions[0].methane_ppb, 1850.0);
        assert_eq!(snapshot.top_regions[4].name, "B");
    }

    #[test]
    fn test_region_snapshot_empty() {
        let rows = vec![aggregate(GeoKey::state("a"), 0.0, 0)];
        assert!(region_snapshot(&GeoKey::Nation, GeoLevel::State, "2021-06", &rows).is_none());
    }

    #[test]
    fn test_surface_with_grid() {
        let samples = vec![
            sample(10.0, 76.0, 1800.0),
            sample(10.5, 76.5, 1900.0),
            sample(11.0, 76.2, 2000.0),
        ];
        let key = GeoKey::district("kerala", "thrissur");
        let surface = district_surface(&key, "2021-06", &samples).unwrap();

        assert_eq!(surface.kind, SurfaceKind::InterpolatedContour);
        assert_eq!(surface.state, "KERALA");
        assert_eq!(surface.district, "THRISSUR");
        assert_eq!(surface.bounds, Bounds::new(10.0, 11.0, 76.0, 76.5));
        assert_eq!(surface.statistics.count, 3);
        assert!(surface.grid.is_some());
    }

    #[test]
    fn test_surface_points_only() {
        let samples = vec![sample(10.0, 76.0, 1800.0), sample(10.5, 76.5, 1900.0)];
        let key = GeoKey::district("kerala", "thrissur");
        let surface = district_surface(&key, "2021-06", &samples).unwrap();

        assert_eq!(surface.kind, SurfaceKind::PointsOnly);
        assert!(surface.grid.is_none());
        assert_eq!(surface.points.len(), 2);

        let json = serde_json::to_value(&surface).unwrap();
        assert_eq!(json["type"], "points_only");
        assert!(json.get("grid").is_none());
    }

    #[test]
    fn test_surface_no_samples() {
        let key = GeoKey::district("kerala", "thrissur");
        assert!(district_surface(&key, "2021-06", &[]).is_none());
    }
}
