//! Spatial interpolation
//!
//! Turns scattered (lat, lon, value) measurements into a regular grid for
//! contour and heatmap rendering.

pub mod idw;

pub use idw::{interpolate_grid, InterpolatedGrid, ValueRange};

use crate::model::EmissionSample;
use serde::{Deserialize, Serialize};

/// A measurement located in (lat, lon) degree space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

impl SpatialPoint {
    pub fn new(lat: f64, lon: f64, value: f64) -> Self {
        Self { lat, lon, value }
    }

    /// Planar distance in degrees, no geodesic correction
    #[inline]
    pub fn planar_distance(&self, lat: f64, lon: f64) -> f64 {
        let dlat = self.lat - lat;
        let dlon = self.lon - lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

impl From<&EmissionSample> for SpatialPoint {
    fn from(sample: &EmissionSample) -> Self {
        Self::new(sample.latitude, sample.longitude, sample.value)
    }
}

/// `count` evenly spaced values from `start` to `end`, both inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| start + (end - start) * (i as f64 / last))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let axis = linspace(10.0, 12.0, 5);
        assert_eq!(axis.len(), 5);
        assert_eq!(axis[0], 10.0);
        assert_relative_eq!(axis[2], 11.0);
        assert_relative_eq!(axis[4], 12.0);
    }

    #[test]
    fn test_linspace_small_counts() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn test_planar_distance() {
        let p = SpatialPoint::new(10.0, 76.0, 1800.0);
        assert_relative_eq!(p.planar_distance(13.0, 80.0), 5.0);
        assert_eq!(p.planar_distance(10.0, 76.0), 0.0);
    }
}
