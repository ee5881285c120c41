//! Centralized constants for the methane-monitor crate
//!
//! Values shared by the store, the analytics routines and the HTTP layer.

/// Geographic constants
pub mod geo {
    /// India bounding box, latitude bounds in degrees
    pub const MIN_LATITUDE: f64 = 6.0;
    pub const MAX_LATITUDE: f64 = 38.0;

    /// India bounding box, longitude bounds in degrees
    pub const MIN_LONGITUDE: f64 = 68.0;
    pub const MAX_LONGITUDE: f64 = 98.0;

    /// Display name for the nation-level geography
    pub const NATION_NAME: &str = "INDIA";
}

/// Emission value constants (ppb)
pub mod emission {
    /// Exclusive lower bound for a plausible reading
    pub const MIN_VALUE: f64 = 0.0;

    /// Exclusive upper bound for a plausible reading
    pub const MAX_VALUE: f64 = 10_000.0;

    /// Colour-scale fallback range used when there is no data
    pub const DEFAULT_COLOR_MIN: f64 = 1700.0;
    pub const DEFAULT_COLOR_MAX: f64 = 2200.0;
}

/// Trend estimation constants
pub mod trend {
    /// Slopes within +/- this value are classified as stable
    pub const DIRECTION_DEADBAND: f64 = 0.01;
}

/// Clustering constants
pub mod clustering {
    /// Minimum and maximum number of clusters
    pub const MIN_CLUSTERS: usize = 2;
    pub const MAX_CLUSTERS: usize = 5;

    /// Hard cap on k-means passes
    pub const MAX_ITERATIONS: usize = 100;
}

/// Spatial interpolation constants
pub mod interpolation {
    /// Cells along each grid axis
    pub const GRID_SIZE: usize = 30;

    /// Minimum number of points needed to build a grid
    pub const MIN_POINTS: usize = 3;

    /// Grid nodes closer than this (degrees) take the point value directly
    pub const COINCIDENCE_EPSILON: f64 = 1e-4;
}

/// Output rounding
pub mod precision {
    /// Decimal places for general numeric output
    pub const VALUE_DECIMALS: u32 = 2;

    /// Decimal places for correlation coefficients
    pub const CORRELATION_DECIMALS: u32 = 3;

    /// Decimal places for regression slopes
    pub const SLOPE_DECIMALS: u32 = 4;
}
