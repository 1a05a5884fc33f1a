//! Persistent store backed by DuckDB
//!
//! The [`Warehouse`] owns a DuckDB connection. The pipeline is its only
//! writer; the metrics endpoint opens it read-only.
//!
//! Loads replace the destination table inside a single transaction, so a
//! reader sees either the previous table or the new one, never a partial one.

mod convert;
mod engine;
mod metrics;

pub use convert::duckdb_value_to_json;
pub use engine::{LoadReport, Warehouse};
pub use metrics::{read_snapshot, vital_alias, MetricsSnapshot};
