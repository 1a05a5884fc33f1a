//! Pipeline configuration
//!
//! All knobs of an ingestion run live in [`PipelineConfig`]. Every field has a
//! default matching the health-metrics export, so an empty YAML document is a
//! valid configuration.

use crate::error::{Error, Result};
use crate::types::{CoercionKind, ColumnType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Defaults
// ============================================================================

/// Fields exported as `TRUE`/`FALSE` literals
pub const DEFAULT_BOOLEAN_COLUMNS: &[&str] = &[
    "Dehydration",
    "Medicine_Overdose",
    "Acidious",
    "Cold",
    "Cough",
];

/// Fields holding numeric measurements
pub const DEFAULT_NUMERIC_COLUMNS: &[&str] = &[
    "Temperature",
    "Heart_Rate",
    "Pulse",
    "BPSYS",
    "BPDIA",
    "Respiratory_Rate",
    "Oxygen_Saturation",
    "PH",
    "Type",
];

/// Vital signs averaged per discriminant value by the metrics endpoint
pub const DEFAULT_VITALS: &[&str] = &[
    "Temperature",
    "Heart_Rate",
    "Respiratory_Rate",
    "Oxygen_Saturation",
];

/// Numeric fields described by the summary report
pub const DEFAULT_SUMMARY_COLUMNS: &[&str] = &[
    "Temperature",
    "Heart_Rate",
    "Pulse",
    "Respiratory_Rate",
    "Oxygen_Saturation",
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_database() -> PathBuf {
    PathBuf::from("health_warehouse.db")
}

fn default_table() -> String {
    "health_metrics".to_string()
}

fn default_discriminant() -> String {
    "Type".to_string()
}

fn default_loaded_at_column() -> String {
    "loaded_at".to_string()
}

fn default_vitals() -> Vec<String> {
    to_strings(DEFAULT_VITALS)
}

fn default_summary_columns() -> Vec<String> {
    to_strings(DEFAULT_SUMMARY_COLUMNS)
}

// ============================================================================
// Column Rules
// ============================================================================

/// Mapping of canonical column names to coercion kinds
///
/// A column may appear in both lists; boolean coercion then runs first and
/// numeric coercion is applied to its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRules {
    #[serde(default)]
    pub boolean: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<String>,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            boolean: to_strings(DEFAULT_BOOLEAN_COLUMNS),
            numeric: to_strings(DEFAULT_NUMERIC_COLUMNS),
        }
    }
}

impl ColumnRules {
    /// Rules with no coerced columns
    pub fn empty() -> Self {
        Self {
            boolean: Vec::new(),
            numeric: Vec::new(),
        }
    }

    /// Build rules from `(column, kind)` pairs
    pub fn from_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = (S, CoercionKind)>,
        S: Into<String>,
    {
        let mut rules = Self::empty();
        for (column, kind) in kinds {
            rules = rules.with(column, kind);
        }
        rules
    }

    /// Add a rule for a column
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, kind: CoercionKind) -> Self {
        let column = column.into();
        let list = match kind {
            CoercionKind::Boolean => &mut self.boolean,
            CoercionKind::Numeric => &mut self.numeric,
        };
        if !list.contains(&column) {
            list.push(column);
        }
        self
    }

    /// Coercions for a column, in the order they are applied
    pub fn kinds_for(&self, column: &str) -> Vec<CoercionKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.boolean.iter().any(|c| c == column) {
            kinds.push(CoercionKind::Boolean);
        }
        if self.numeric.iter().any(|c| c == column) {
            kinds.push(CoercionKind::Numeric);
        }
        kinds
    }

    /// Storage type a column ends up with after coercion
    pub fn column_type(&self, column: &str) -> ColumnType {
        match self.kinds_for(column).last() {
            Some(CoercionKind::Numeric) => ColumnType::Number,
            Some(CoercionKind::Boolean) => ColumnType::Integer,
            None => ColumnType::Text,
        }
    }

    /// Columns listed under both kinds
    pub fn overlapping(&self) -> Vec<&str> {
        self.boolean
            .iter()
            .filter(|c| self.numeric.contains(c))
            .map(String::as_str)
            .collect()
    }
}

// ============================================================================
// Pipeline Config
// ============================================================================

/// Configuration of an ingestion run and of the metrics reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// DuckDB database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Destination table
    #[serde(default = "default_table")]
    pub table: String,

    /// Required discriminant column
    #[serde(default = "default_discriminant")]
    pub discriminant: String,

    /// Metadata column stamped with the ingestion instant
    #[serde(default = "default_loaded_at_column")]
    pub loaded_at_column: String,

    /// Coercion rules
    #[serde(default)]
    pub columns: ColumnRules,

    /// Vital signs averaged per discriminant value
    #[serde(default = "default_vitals")]
    pub vitals: Vec<String>,

    /// Numeric columns described by the summary report
    #[serde(default = "default_summary_columns")]
    pub summary_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            table: default_table(),
            discriminant: default_discriminant(),
            loaded_at_column: default_loaded_at_column(),
            columns: ColumnRules::default(),
            vitals: default_vitals(),
            summary_columns: default_summary_columns(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Use a different database file
    #[must_use]
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    /// Use a different destination table
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use different coercion rules
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnRules) -> Self {
        self.columns = columns;
        self
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Error::config("table name must not be empty"));
        }
        if self.discriminant.trim().is_empty() {
            return Err(Error::config("discriminant column must not be empty"));
        }
        if self.loaded_at_column.trim().is_empty() {
            return Err(Error::config("loaded_at column must not be empty"));
        }
        if self.loaded_at_column == self.discriminant {
            return Err(Error::config(format!(
                "discriminant '{}' cannot double as the loaded_at column",
                self.discriminant
            )));
        }

        let overlapping = self.columns.overlapping();
        if !overlapping.is_empty() {
            tracing::warn!(
                "Columns {:?} have both boolean and numeric rules; boolean runs first",
                overlapping
            );
        }

        Ok(())
    }
}
