//! Extract, transform and load in one synchronous run
//!
//! A run works on one full file. Every stage finishes before the next
//! starts, and any error aborts the whole run. Nothing is written to the
//! store unless extract and transform both succeed.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingest;
use crate::report::SummaryReport;
use crate::store::{LoadReport, Warehouse};
use crate::transform::Transformer;
use crate::types::{Batch, RawTable};
use chrono::{Local, NaiveDateTime};
use std::path::Path;

/// Result of a completed run
///
/// The caller owns the warehouse handle and decides when to close it.
#[derive(Debug)]
pub struct RunOutcome {
    pub batch: Batch,
    pub load: LoadReport,
    pub warehouse: Warehouse,
}

/// The ETL pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    transformer: Transformer,
}

impl Pipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let transformer = Transformer::from_config(&config);
        Ok(Self {
            config,
            transformer,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform an already extracted table
    pub fn transform(&self, raw: &RawTable, loaded_at: NaiveDateTime) -> Result<Batch> {
        self.transformer.transform(raw, loaded_at)
    }

    /// Extract a file and transform it, stamping the current local time
    pub fn extract_and_transform(&self, path: impl AsRef<Path>) -> Result<Batch> {
        self.extract_and_transform_at(path, Local::now().naive_local())
    }

    /// Extract a file and transform it with an explicit stamp
    pub fn extract_and_transform_at(
        &self,
        path: impl AsRef<Path>,
        loaded_at: NaiveDateTime,
    ) -> Result<Batch> {
        let path = path.as_ref();
        tracing::info!("Extracting {}", path.display());
        let raw = ingest::extract(path)?;
        tracing::debug!("Read {} rows with {} columns", raw.len(), raw.headers.len());
        self.transform(&raw, loaded_at)
    }

    /// Replace the configured table with a batch
    pub fn load(&self, batch: &Batch) -> Result<(Warehouse, LoadReport)> {
        let mut warehouse = Warehouse::open(&self.config.database)?;
        let report = warehouse.load(batch, &self.config.table)?;
        if let Some(sample) = &report.sample {
            tracing::info!("Sample record from database: {}", serde_json::Value::Object(sample.clone()));
        }
        Ok((warehouse, report))
    }

    /// Run extract, transform and load for one file
    pub fn run(&self, path: impl AsRef<Path>) -> Result<RunOutcome> {
        self.run_at(path, Local::now().naive_local())
    }

    /// Run the whole pipeline with an explicit stamp
    pub fn run_at(&self, path: impl AsRef<Path>, loaded_at: NaiveDateTime) -> Result<RunOutcome> {
        let batch = self.extract_and_transform_at(path, loaded_at)?;
        let (warehouse, load) = self.load(&batch)?;
        Ok(RunOutcome {
            batch,
            load,
            warehouse,
        })
    }

    /// Summary statistics of a batch using the configured columns
    pub fn summary(&self, batch: &Batch) -> SummaryReport {
        SummaryReport::from_batch(batch, &self.config.discriminant, &self.config.summary_columns)
    }
}

#[cfg(test)]
mod tests;
