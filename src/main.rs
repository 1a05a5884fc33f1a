//! Health warehouse CLI
//!
//! Loads CSV exports and serves metrics

use clap::Parser;
use health_warehouse::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error [{}]: {e}", e.stage());
        if e.is_pre_load() {
            eprintln!("Nothing was written to the store.");
        }
        std::process::exit(1);
    }
}
