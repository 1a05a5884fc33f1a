//! Transform stage
//!
//! Turns a [`RawTable`] into a [`Batch`]:
//!
//! 1. canonicalize the header row,
//! 2. coerce the cells of ruled columns,
//! 3. require the discriminant column,
//! 4. stamp the batch with its ingestion instant.
//!
//! This stage performs no I/O. A batch is either produced whole or rejected.

mod coerce;
mod normalize;
mod validate;

pub use coerce::{apply, coerce_boolean, coerce_cell, coerce_numeric};
pub use normalize::{canonicalize, normalize_headers};
pub use validate::validate_columns;

use crate::config::{ColumnRules, PipelineConfig};
use crate::error::Result;
use crate::types::{Batch, CoercionKind, ColumnDef, HealthRecord, RawTable};
use chrono::NaiveDateTime;

/// Applies normalization, coercion, validation and stamping
#[derive(Debug, Clone)]
pub struct Transformer {
    rules: ColumnRules,
    discriminant: String,
    loaded_at_column: String,
}

impl Transformer {
    /// Create a transformer from explicit settings
    pub fn new(
        rules: ColumnRules,
        discriminant: impl Into<String>,
        loaded_at_column: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            discriminant: discriminant.into(),
            loaded_at_column: loaded_at_column.into(),
        }
    }

    /// Create a transformer from a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.columns.clone(),
            config.discriminant.clone(),
            config.loaded_at_column.clone(),
        )
    }

    /// Transform a raw table into a batch stamped with `loaded_at`
    pub fn transform(&self, raw: &RawTable, loaded_at: NaiveDateTime) -> Result<Batch> {
        let names = normalize_headers(&raw.headers);
        tracing::debug!("Original columns: {:?}", raw.headers);
        tracing::debug!("Cleaned columns: {:?}", names);

        // The stamp wins over any source column of the same name
        let kept: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let clash = name.eq_ignore_ascii_case(&self.loaded_at_column);
                if clash {
                    tracing::warn!(
                        "Dropping source column '{}', it is reserved for the load stamp",
                        name
                    );
                }
                !clash
            })
            .map(|(idx, _)| idx)
            .collect();

        let plans: Vec<Vec<CoercionKind>> = kept
            .iter()
            .map(|&idx| self.rules.kinds_for(&names[idx]))
            .collect();

        let records: Vec<HealthRecord> = raw
            .rows
            .iter()
            .map(|row| HealthRecord {
                values: kept
                    .iter()
                    .zip(&plans)
                    .map(|(&idx, kinds)| {
                        let cell = row.get(idx).and_then(Option::as_deref);
                        coerce_cell(cell, kinds)
                    })
                    .collect(),
            })
            .collect();

        let kept_names: Vec<&str> = kept.iter().map(|&idx| names[idx].as_str()).collect();
        validate_columns(&kept_names, &self.discriminant)?;

        let columns = kept
            .iter()
            .map(|&idx| ColumnDef::new(names[idx].clone(), self.rules.column_type(&names[idx])))
            .collect();

        Ok(Batch {
            columns,
            records,
            loaded_at,
            loaded_at_column: self.loaded_at_column.clone(),
        })
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests;
