// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Health Warehouse
//!
//! Loads a health-metrics CSV export into a DuckDB warehouse and serves
//! read-only aggregates of it over HTTP.
//!
//! ## Features
//!
//! - **Encoding Fallback**: UTF-8 first, windows-1252 when that fails
//! - **Canonical Columns**: headers trimmed, underscored and stripped of punctuation
//! - **Lenient Coercion**: malformed booleans and numbers become null, never errors
//! - **Replace-on-Load**: each load fully supersedes the previous table in one transaction
//! - **Metrics Endpoint**: counts and vital-sign means per condition type
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use health_warehouse::{Pipeline, PipelineConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let pipeline = Pipeline::new(PipelineConfig::default())?;
//!     let outcome = pipeline.run("health_data.csv")?;
//!     println!("{}", pipeline.summary(&outcome.batch));
//!     outcome.warehouse.close()
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!  CSV file ─► ingest ─► transform ─────────────► store ◄── metrics endpoint
//!              decode     canonicalize columns    DuckDB     (read-only)
//!              parse      coerce cells            replace
//!                         require discriminant    read back
//!                         stamp loaded_at
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types
pub mod types;

/// Pipeline configuration
pub mod config;

/// Extract stage: encoding resolution and CSV parsing
pub mod ingest;

/// Transform stage: normalization, coercion, validation
pub mod transform;

/// Extract-transform-load orchestration
pub mod pipeline;

/// DuckDB-backed store and aggregate reads
pub mod store;

/// Summary statistics
pub mod report;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ColumnRules, PipelineConfig};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunOutcome};
pub use store::{LoadReport, MetricsSnapshot, Warehouse};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
