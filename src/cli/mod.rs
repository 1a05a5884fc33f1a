//! CLI module
//!
//! Command-line interface for the warehouse.
//!
//! # Commands
//!
//! - `load` - Extract, transform and load a CSV file, then print a summary
//! - `inspect` - Extract and transform only, without touching the store
//! - `serve` - Start the metrics HTTP endpoint

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
