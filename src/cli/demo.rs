//! Demo command handler
//!
//! Writes a seeded synthetic dataset for local development.

use crate::cli::resolve_data_path;
use crate::config::Config;
use crate::error::Result;
use crate::store::synthetic::{generate, SyntheticParams};
use crate::store::EmissionRepository;
use clap::Args;
use std::path::PathBuf;

/// Demo command arguments
#[derive(Args)]
pub struct DemoArgs {
    /// Random seed
    #[arg(long, short = 's', default_value_t = 42)]
    pub seed: u64,

    /// First year of data
    #[arg(long, default_value_t = 2019)]
    pub start_year: i32,

    /// Number of years
    #[arg(long, default_value_t = 3)]
    pub years: i32,

    /// Samples per district and month
    #[arg(long, default_value_t = 8)]
    pub samples_per_month: usize,

    /// Output file (defaults to the configured data path)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run the demo command
pub fn run(args: DemoArgs) -> Result<()> {
    let config = Config::load()?;
    let path = resolve_data_path(&config, args.output)?;

    let store = generate(&SyntheticParams {
        seed: args.seed,
        start_year: args.start_year,
        years: args.years,
        samples_per_month: args.samples_per_month,
    });
    store.save_to(&path)?;

    println!(
        "Wrote {} samples for {} states to {}",
        store.len(),
        store.states()?.len(),
        path.display()
    );

    Ok(())
}
