//! Server shared state
//!
//! Holds configuration and the analytics service for the HTTP server.

use crate::analytics::AnalyticsService;
use crate::config::Config;
use crate::store::EmissionRepository;
use std::sync::Arc;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Analytics over the loaded dataset
    pub service: AnalyticsService,
}

impl AppState {
    /// Create new application state over a repository
    pub fn new(config: Config, repo: Arc<dyn EmissionRepository>) -> Self {
        let service = AnalyticsService::new(repo, config.analytics.clone());
        Self { config, service }
    }
}
