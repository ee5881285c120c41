//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod analyze;
pub mod config;
pub mod demo;
pub mod serve;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{EmissionRepository, InMemoryStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Methane emissions analytics and map data service
#[derive(Parser)]
#[command(name = "methane-monitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Run an analysis and print the report
    Analyze(analyze::AnalyzeArgs),

    /// Write a synthetic demo dataset
    Demo(demo::DemoArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Analyze(args) => analyze::run(args),
        Commands::Demo(args) => demo::run(args),
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize logging, honouring `RUST_LOG` over `default_filter`
pub(crate) fn init_tracing(default_filter: &str) {
    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dataset path: the `--data` override, else the configured path
pub(crate) fn resolve_data_path(config: &Config, data: Option<PathBuf>) -> Result<PathBuf> {
    match data {
        Some(path) => Ok(path),
        None => config.data_path(),
    }
}

/// Open the emission store at `path`
pub fn open_store(path: &Path) -> Result<Arc<dyn EmissionRepository>> {
    if !path.exists() {
        return Err(Error::Store(format!(
            "No dataset at {} (run `methane-monitor demo` to create one)",
            path.display()
        )));
    }
    Ok(Arc::new(InMemoryStore::load_from(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "methane-monitor",
            "analyze",
            "--format",
            "json",
            "ranking",
            "2021",
            "3",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn test_resolve_data_path() {
        let config = Config::default();
        let path = resolve_data_path(&config, Some(PathBuf::from("/tmp/x.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn test_open_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        let result = open_store(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Store(_))));
    }
}
