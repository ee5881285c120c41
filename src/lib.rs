//! methane-monitor: Methane Emissions Analytics
//!
//! A library and CLI tool for analysing satellite methane concentration
//! samples over India's state and district hierarchy.
//!
//! ## Features
//!
//! - Monthly time series with trends, peak month and seasonal breakdown
//! - Deterministic 1-D k-means clustering of districts
//! - Pairwise district correlation, state/district rankings, extreme events
//! - Inverse-distance-weighted interpolation grids for contour maps
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use methane_monitor::analytics::AnalyticsService;
//! use methane_monitor::config::AnalyticsConfig;
//! use methane_monitor::store::synthetic::{generate, SyntheticParams};
//! use methane_monitor::store::EmissionRepository;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn EmissionRepository> = Arc::new(generate(&SyntheticParams::default()));
//! let service = AnalyticsService::new(store, AnalyticsConfig::default());
//!
//! let ranking = service.get_ranking(2020, 6).unwrap();
//! println!("Highest state: {}", ranking.state_rankings[0].name);
//!
//! let clusters = service.get_clustering("kerala").unwrap();
//! println!("Clusters ready: {}", clusters.is_ready());
//! ```

pub mod analytics;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod model;
pub mod server;
pub mod spatial;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use analytics::{AnalysisOutcome, AnalyticsService};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{EmissionSample, GeoKey, MonthlyAggregate};
pub use store::{EmissionRepository, InMemoryStore};
