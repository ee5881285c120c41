//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::cli::{init_tracing, open_store, resolve_data_path};
use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Sample dataset (JSON)
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    init_tracing("info");

    // Load and optionally override config
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let data_path = resolve_data_path(&config, args.data)?;
    let repo = open_store(&data_path)?;

    info!(
        "Starting methane-monitor server v{} on {} with data from {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr(),
        data_path.display()
    );

    server::run(config, repo).await
}
