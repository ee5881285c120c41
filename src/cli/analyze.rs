//! Analyze command handler
//!
//! Runs one analysis against the dataset and prints the report.

use crate::analytics::AnalyticsService;
use crate::cli::{init_tracing, open_store, resolve_data_path};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, Report};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Analyze command arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub analysis: Analysis,

    /// Output format (json or text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<String>,

    /// Sample dataset (JSON)
    #[arg(long, short = 'd', global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Analysis {
    /// Monthly time series, trends and seasons of a district
    Timeseries { state: String, district: String },

    /// Cluster the districts of a state by average emission
    Clustering { state: String },

    /// Rank states and districts for a month
    Ranking { year: i32, month: u32 },

    /// Correlate district time series within a state
    Correlation { state: String },

    /// Samples of a district above a percentile threshold
    Extremes {
        state: String,
        district: String,

        /// Threshold percentile in (0, 100]
        #[arg(long, short = 'p')]
        percentile: Option<f64>,
    },
}

/// Run the analyze command
pub fn run(args: AnalyzeArgs) -> Result<()> {
    init_tracing("warn");

    let config = Config::load()?;

    let format_name = args.format.as_deref().unwrap_or(&config.output.format);
    let formatter = get_formatter(format_name).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format '{}'. Available: {}",
            format_name,
            names.join(", ")
        ))
    })?;

    let data_path = resolve_data_path(&config, args.data)?;
    let service = AnalyticsService::new(open_store(&data_path)?, config.analytics.clone());

    let report = analyze(&service, args.analysis)?;
    println!("{}", formatter.format(&report)?.trim_end());

    Ok(())
}

/// Run one analysis
pub fn analyze(service: &AnalyticsService, analysis: Analysis) -> Result<Report> {
    Ok(match analysis {
        Analysis::Timeseries { state, district } => {
            Report::TimeSeries(service.get_timeseries(&state, &district)?)
        }
        Analysis::Clustering { state } => Report::Clustering(service.get_clustering(&state)?),
        Analysis::Ranking { year, month } => Report::Ranking(service.get_ranking(year, month)?),
        Analysis::Correlation { state } => Report::Correlation(service.get_correlation(&state)?),
        Analysis::Extremes {
            state,
            district,
            percentile,
        } => Report::Extremes(service.get_extreme_events(&state, &district, percentile)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::store::synthetic::{generate, SyntheticParams};
    use crate::store::EmissionRepository;
    use std::sync::Arc;

    fn create_test_service() -> AnalyticsService {
        let store = generate(&SyntheticParams {
            years: 1,
            samples_per_month: 4,
            ..SyntheticParams::default()
        });
        let repo: Arc<dyn EmissionRepository> = Arc::new(store);
        AnalyticsService::new(repo, AnalyticsConfig::default())
    }

    #[test]
    fn test_analyze_each_kind() {
        let service = create_test_service();

        let report = analyze(
            &service,
            Analysis::Timeseries {
                state: "kerala".to_string(),
                district: "thrissur".to_string(),
            },
        )
        .unwrap();
        match report {
            Report::TimeSeries(outcome) => {
                assert_eq!(outcome.ready().unwrap().time_series.len(), 12)
            }
            _ => panic!("wrong report kind"),
        }

        let report = analyze(
            &service,
            Analysis::Clustering {
                state: "kerala".to_string(),
            },
        )
        .unwrap();
        match report {
            Report::Clustering(outcome) => {
                assert_eq!(outcome.ready().unwrap().district_clusters.len(), 6)
            }
            _ => panic!("wrong report kind"),
        }

        let report = analyze(&service, Analysis::Ranking { year: 2019, month: 6 }).unwrap();
        match report {
            Report::Ranking(ranking) => {
                assert_eq!(ranking.total_states, 3);
                assert_eq!(ranking.total_districts, 12);
            }
            _ => panic!("wrong report kind"),
        }
    }

    #[test]
    fn test_analyze_rejects_bad_input() {
        let service = create_test_service();
        assert!(analyze(&service, Analysis::Ranking { year: 2019, month: 13 }).is_err());
        assert!(analyze(
            &service,
            Analysis::Extremes {
                state: "kerala".to_string(),
                district: "thrissur".to_string(),
                percentile: Some(0.0),
            }
        )
        .is_err());
    }
}
