//! Inverse-distance-weighted grid builder
//!
//! Each grid node takes the weighted mean of all input values with weight
//! `1 / d^2`, where `d` is the planar distance in degrees. Nodes within
//! 1e-4 degrees of an input point take that point's value directly.

use crate::constants::{interpolation, precision};
use crate::error::{Error, Result};
use crate::model::Bounds;
use crate::spatial::{linspace, SpatialPoint};
use crate::stats::round_to;
use serde::{Deserialize, Serialize};

/// Summary of the positive grid values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// A regular grid of interpolated values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedGrid {
    /// Latitude of each grid row
    pub lat_axis: Vec<f64>,
    /// Longitude of each grid column
    pub lon_axis: Vec<f64>,
    /// Values indexed [lat][lon]
    pub values: Vec<Vec<f64>>,
    pub bounds: Bounds,
    pub method: String,
    pub value_range: ValueRange,
}

impl InterpolatedGrid {
    /// Copy with grid values and range rounded for output
    pub fn rounded(&self) -> Self {
        let r = |v: f64| round_to(v, precision::VALUE_DECIMALS);
        Self {
            lat_axis: self.lat_axis.clone(),
            lon_axis: self.lon_axis.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| r(*v)).collect())
                .collect(),
            bounds: self.bounds,
            method: self.method.clone(),
            value_range: ValueRange {
                min: r(self.value_range.min),
                max: r(self.value_range.max),
                mean: r(self.value_range.mean),
            },
        }
    }

    /// Value at a grid node
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Build a 30x30 IDW grid spanning `bounds`
///
/// # Errors
/// [`Error::InsufficientPoints`] when fewer than 3 points are supplied; no
/// partial grid is ever returned.
pub fn interpolate_grid(points: &[SpatialPoint], bounds: &Bounds) -> Result<InterpolatedGrid> {
    interpolate_grid_with_size(points, bounds, interpolation::GRID_SIZE)
}

/// Build an IDW grid of `grid_size` x `grid_size` nodes
pub fn interpolate_grid_with_size(
    points: &[SpatialPoint],
    bounds: &Bounds,
    grid_size: usize,
) -> Result<InterpolatedGrid> {
    if points.len() < interpolation::MIN_POINTS {
        return Err(Error::InsufficientPoints {
            required: interpolation::MIN_POINTS,
            actual: points.len(),
        });
    }

    let lat_axis = linspace(bounds.min_lat, bounds.max_lat, grid_size);
    let lon_axis = linspace(bounds.min_lon, bounds.max_lon, grid_size);

    let values: Vec<Vec<f64>> = lat_axis
        .iter()
        .map(|&lat| {
            lon_axis
                .iter()
                .map(|&lon| interpolate_node(points, lat, lon))
                .collect()
        })
        .collect();

    let value_range = positive_range(&values);

    Ok(InterpolatedGrid {
        lat_axis,
        lon_axis,
        values,
        bounds: *bounds,
        method: "idw".to_string(),
        value_range,
    })
}

/// IDW estimate at a single node
fn interpolate_node(points: &[SpatialPoint], lat: f64, lon: f64) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for point in points {
        let distance = point.planar_distance(lat, lon);
        if distance < interpolation::COINCIDENCE_EPSILON {
            return point.value;
        }
        let weight = 1.0 / (distance * distance);
        weighted_sum += point.value * weight;
        weight_total += weight;
    }

    if weight_total > 0.0 && weight_total.is_finite() {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

/// min/max/mean over strictly positive values; 0 marks "no estimate"
fn positive_range(values: &[Vec<f64>]) -> ValueRange {
    let positive: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| *v > 0.0)
        .collect();

    if positive.is_empty() {
        return ValueRange::default();
    }

    ValueRange {
        min: positive.iter().copied().fold(f64::INFINITY, f64::min),
        max: positive.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: positive.iter().sum::<f64>() / positive.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> (Vec<SpatialPoint>, Bounds) {
        let points = vec![
            SpatialPoint::new(10.0, 76.0, 1800.0),
            SpatialPoint::new(11.0, 77.0, 2000.0),
            SpatialPoint::new(10.0, 77.0, 1900.0),
        ];
        (points, Bounds::new(10.0, 11.0, 76.0, 77.0))
    }

    #[test]
    fn test_grid_shape() {
        let (points, bounds) = triangle();
        let grid = interpolate_grid(&points, &bounds).unwrap();

        assert_eq!(grid.lat_axis.len(), 30);
        assert_eq!(grid.lon_axis.len(), 30);
        assert_eq!(grid.values.len(), 30);
        assert!(grid.values.iter().all(|row| row.len() == 30));
        assert_eq!(grid.lat_axis[0], 10.0);
        assert_relative_eq!(grid.lat_axis[29], 11.0);
        assert_eq!(grid.method, "idw");
    }

    #[test]
    fn test_nodes_on_points_take_exact_values() {
        let (points, bounds) = triangle();
        let grid = interpolate_grid(&points, &bounds).unwrap();

        assert_eq!(grid.value_at(0, 0), Some(1800.0));
        assert_eq!(grid.value_at(29, 29), Some(2000.0));
        assert_eq!(grid.value_at(0, 29), Some(1900.0));
    }

    #[test]
    fn test_values_stay_within_input_range() {
        let (points, bounds) = triangle();
        let grid = interpolate_grid(&points, &bounds).unwrap();

        for v in grid.values.iter().flatten() {
            assert!(*v >= 1800.0 - 1e-9 && *v <= 2000.0 + 1e-9);
        }
        assert_relative_eq!(grid.value_range.min, 1800.0);
        assert_relative_eq!(grid.value_range.max, 2000.0);
        assert!(grid.value_range.mean > 1800.0 && grid.value_range.mean < 2000.0);
    }

    #[test]
    fn test_insufficient_points() {
        let (points, bounds) = triangle();
        let result = interpolate_grid(&points[..2], &bounds);
        assert!(matches!(
            result,
            Err(Error::InsufficientPoints {
                required: 3,
                actual: 2
            })
        ));
        assert!(interpolate_grid(&[], &bounds).is_err());
    }

    #[test]
    fn test_degenerate_bounds() {
        // All points share one location: every node coincides with it
        let points = vec![
            SpatialPoint::new(10.0, 76.0, 1850.0),
            SpatialPoint::new(10.0, 76.0, 1850.0),
            SpatialPoint::new(10.0, 76.0, 1850.0),
        ];
        let bounds = Bounds::new(10.0, 10.0, 76.0, 76.0);
        let grid = interpolate_grid(&points, &bounds).unwrap();
        assert!(grid.values.iter().flatten().all(|v| *v == 1850.0));
    }

    #[test]
    fn test_rounded_grid() {
        let (points, bounds) = triangle();
        let grid = interpolate_grid(&points, &bounds).unwrap().rounded();
        for v in grid.values.iter().flatten() {
            assert_eq!(*v, round_to(*v, 2));
        }
    }

    #[test]
    fn test_positive_range_ignores_zeros() {
        let range = positive_range(&[vec![0.0, 2.0], vec![4.0, 0.0]]);
        assert_eq!(range.min, 2.0);
        assert_eq!(range.max, 4.0);
        assert_eq!(range.mean, 3.0);
        assert_eq!(positive_range(&[vec![0.0]]), ValueRange::default());
    }
}
