//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8088;

/// Maximum number of districts listed in a ranking
pub const DEFAULT_DISTRICT_RANKING_LIMIT: usize = 100;

/// Number of strongest and weakest correlation pairs reported
pub const DEFAULT_TOP_CORRELATIONS: usize = 5;

/// Percentile above which a sample counts as an extreme event
pub const DEFAULT_EXTREME_THRESHOLD_PERCENTILE: f64 = 90.0;

/// Default output format for the analyze command
pub const DEFAULT_FORMAT: &str = "text";

/// Sample dataset file name (inside the data directory)
pub const DATA_FILE_NAME: &str = "samples.json";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "methane-monitor";
