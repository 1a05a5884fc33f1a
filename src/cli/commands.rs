//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Health metrics warehouse CLI
#[derive(Parser, Debug)]
#[command(name = "health-warehouse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// DuckDB database file (overrides the config file)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Destination table (overrides the config file)
    #[arg(short, long, global = true)]
    pub table: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a CSV export into the warehouse, replacing its previous contents
    Load {
        /// CSV file to ingest
        #[arg(default_value = "health_data.csv")]
        file: PathBuf,

        /// Skip the summary statistics
        #[arg(long)]
        no_summary: bool,
    },

    /// Transform a CSV export and print its columns and summary without loading it
    Inspect {
        /// CSV file to inspect
        file: PathBuf,
    },

    /// Start the metrics HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
}
