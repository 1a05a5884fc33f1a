//! Read-only aggregate views over the loaded table

use super::engine::{quote_ident, Warehouse};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::JsonObject;
use serde::Serialize;

/// Body of the metrics endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Record count per discriminant value
    pub severity_counts: Vec<JsonObject>,
    /// Mean of each vital per discriminant value
    pub vitals_by_type: Vec<JsonObject>,
    /// Every stored record
    pub all_records: Vec<JsonObject>,
}

impl MetricsSnapshot {
    /// Snapshot of a store that was never loaded
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Output key of the mean of a vital
pub fn vital_alias(vital: &str) -> String {
    format!("avg_{}", vital.to_lowercase())
}

impl Warehouse {
    /// Count of records per discriminant value
    pub fn severity_counts(&self, table: &str, discriminant: &str) -> Result<Vec<JsonObject>> {
        let d = quote_ident(discriminant);
        let sql = format!(
            "SELECT {d}, COUNT(*) AS count FROM {} GROUP BY {d} ORDER BY {d} NULLS LAST",
            quote_ident(table)
        );
        self.query_objects(&sql)
    }

    /// Mean of each vital per discriminant value
    ///
    /// Nulls are left out of each mean. A vital the table does not have
    /// averages to null.
    pub fn vitals_by_type(
        &self,
        table: &str,
        discriminant: &str,
        vitals: &[String],
    ) -> Result<Vec<JsonObject>> {
        let present = self.table_columns(table)?;
        let d = quote_ident(discriminant);

        let mut select = vec![d.clone()];
        for vital in vitals {
            let alias = quote_ident(&vital_alias(vital));
            if present.iter().any(|c| c == vital) {
                select.push(format!(
                    "AVG(TRY_CAST({} AS DOUBLE)) AS {alias}",
                    quote_ident(vital)
                ));
            } else {
                tracing::debug!("Vital '{}' not in table '{}'", vital, table);
                select.push(format!("CAST(NULL AS DOUBLE) AS {alias}"));
            }
        }

        let sql = format!(
            "SELECT {} FROM {} GROUP BY {d} ORDER BY {d} NULLS LAST",
            select.join(", "),
            quote_ident(table)
        );
        self.query_objects(&sql)
    }

    /// Build the full metrics view; empty when the table does not exist
    pub fn metrics_snapshot(&self, config: &PipelineConfig) -> Result<MetricsSnapshot> {
        if !self.table_exists(&config.table)? {
            tracing::warn!(
                "Table '{}' not found in {}, serving empty metrics",
                config.table,
                self.location()
            );
            return Ok(MetricsSnapshot::empty());
        }

        Ok(MetricsSnapshot {
            severity_counts: self.severity_counts(&config.table, &config.discriminant)?,
            vitals_by_type: self.vitals_by_type(
                &config.table,
                &config.discriminant,
                &config.vitals,
            )?,
            all_records: self.all_records(&config.table)?,
        })
    }
}

/// Read a snapshot from the configured database file
///
/// A database file that does not exist yet yields an empty snapshot. While
/// another process holds the write lock the read-only open fails and the
/// error is returned as is.
pub fn read_snapshot(config: &PipelineConfig) -> Result<MetricsSnapshot> {
    match Warehouse::open_read_only(&config.database)? {
        Some(warehouse) => warehouse.metrics_snapshot(config),
        None => {
            tracing::warn!(
                "Database '{}' does not exist, serving empty metrics",
                config.database.display()
            );
            Ok(MetricsSnapshot::empty())
        }
    }
}
