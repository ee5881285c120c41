//! Output formatters
//!
//! Provides trait-based output formatting for analytics reports.

pub mod json;
pub mod text;

use crate::analytics::{
    AnalysisOutcome, ClusteringReport, CorrelationReport, ExtremeEventsReport, RankingReport,
    TimeSeriesReport,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Any report the analyze command can print
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    TimeSeries(AnalysisOutcome<TimeSeriesReport>),
    Clustering(AnalysisOutcome<ClusteringReport>),
    Ranking(RankingReport),
    Correlation(AnalysisOutcome<CorrelationReport>),
    Extremes(AnalysisOutcome<ExtremeEventsReport>),
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a report
    fn format(&self, report: &Report) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Full JSON report".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable summary".to_string(),
        },
    ]
}
