//! methane-monitor CLI entry point
//!
//! Methane emissions analytics - CLI + web API

use methane_monitor::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
