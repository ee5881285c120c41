//! Error types for methane-monitor

use thiserror::Error;

/// Main error type for methane-monitor operations
#[derive(Error, Debug)]
pub enum Error {
    /// The data store could not be read
    #[error("Store error: {0}")]
    Store(String),

    /// An operation was invoked on data that cannot support it
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Insufficient points for interpolation: need {required}, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for methane-monitor operations
pub type Result<T> = std::result::Result<T, Error>;
