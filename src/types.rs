//! Common types used throughout the health warehouse
//!
//! Raw tables come out of the extract stage, batches come out of the
//! transform stage and are what the store loads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// ISO-8601 format used when a timestamp is rendered as JSON
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// ============================================================================
// Raw Data
// ============================================================================

/// A decoded CSV file before any transformation
///
/// Cells are `None` when a row is shorter than the header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header strings exactly as they appear in the file
    pub headers: Vec<String>,
    /// Data rows, each aligned with `headers`
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Coercion
// ============================================================================

/// How a raw cell is converted to a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    /// Literal `TRUE`/`FALSE` to 1/0, anything else to null
    Boolean,
    /// Floating-point parse, failures to null
    Numeric,
}

/// Storage type of a transformed column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Nullable 64-bit integer (boolean-origin fields)
    Integer,
    /// Nullable double
    Number,
    /// Nullable text, passed through unchanged
    Text,
}

impl ColumnType {
    /// SQL type used by the store
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Number => "DOUBLE",
            ColumnType::Text => "VARCHAR",
        }
    }
}

/// A canonical column and its storage type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

// ============================================================================
// Typed Data
// ============================================================================

/// A typed cell of a health record
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Boolean-origin value: 1, 0 or unknown
    Integer(Option<i64>),
    /// Numeric value or unknown
    Number(Option<f64>),
    /// Raw text of a column without coercion rules
    Text(Option<String>),
}

impl CellValue {
    /// Whether the value is unknown
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Integer(v) => v.is_none(),
            CellValue::Number(v) => v.is_none(),
            CellValue::Text(v) => v.is_none(),
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => v.map(|i| i as f64),
            CellValue::Number(v) => *v,
            CellValue::Text(_) => None,
        }
    }

    /// Text view of the value (numbers rendered without a trailing `.0`)
    pub fn as_display(&self) -> Option<String> {
        match self {
            CellValue::Integer(v) => v.map(|i| i.to_string()),
            CellValue::Number(v) => v.map(|f| f.to_string()),
            CellValue::Text(v) => v.clone(),
        }
    }

    /// Convert to a JSON value (non-finite numbers become null)
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Integer(Some(i)) => JsonValue::Number((*i).into()),
            CellValue::Number(Some(f)) => {
                serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
            }
            CellValue::Text(Some(s)) => JsonValue::String(s.clone()),
            _ => JsonValue::Null,
        }
    }
}

/// One transformed row, aligned with the columns of its batch
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub values: Vec<CellValue>,
}

/// A fully transformed set of records sharing one schema and one load instant
#[derive(Debug, Clone)]
pub struct Batch {
    /// Canonical columns in source order
    pub columns: Vec<ColumnDef>,
    /// Records in source order
    pub records: Vec<HealthRecord>,
    /// Ingestion instant shared by every record
    pub loaded_at: NaiveDateTime,
    /// Name of the metadata column holding `loaded_at`
    pub loaded_at_column: String,
}

impl Batch {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a single cell
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.records.get(row).and_then(|r| r.values.get(idx))
    }

    /// All cells of one column, in record order
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a CellValue>> {
        let idx = self.column_index(column)?;
        Some(self.records.iter().filter_map(move |r| r.values.get(idx)))
    }

    /// Render one record as a JSON object, including the load stamp
    pub fn record_json(&self, row: usize) -> Option<JsonObject> {
        let record = self.records.get(row)?;
        let mut obj: JsonObject = self
            .columns
            .iter()
            .zip(&record.values)
            .map(|(col, value)| (col.name.clone(), value.to_json()))
            .collect();
        obj.insert(
            self.loaded_at_column.clone(),
            JsonValue::String(self.loaded_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        Some(obj)
    }
}
