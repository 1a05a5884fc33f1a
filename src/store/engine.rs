//! DuckDB-backed warehouse
//!
//! Writes batches with replace-on-load semantics and reads tables back as
//! JSON objects.

use super::convert::{cell_to_sql, duckdb_value_to_json};
use crate::error::{Error, Result};
use crate::types::{Batch, JsonObject};
use chrono::NaiveDateTime;
use duckdb::{params, params_from_iter, AccessMode, Config, Connection};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Timestamp format DuckDB casts from
const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Outcome of a successful load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Destination table
    pub table: String,
    /// Rows present in the table after the load
    pub rows_loaded: usize,
    /// Ingestion instant stamped on every row
    pub loaded_at: NaiveDateTime,
    /// First row read back after the load
    pub sample: Option<JsonObject>,
}

/// Handle to the persistent store
pub struct Warehouse {
    /// DuckDB connection
    conn: Connection,
    /// Database file, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse")
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

impl Warehouse {
    /// Open (or create) a database file for reading and writing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::load(format!(
                "Failed to open DuckDB database '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::load(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self { conn, path: None })
    }

    /// Open an existing database file read-only
    ///
    /// Returns `None` when the file does not exist yet.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| Error::query(format!("Invalid DuckDB config: {e}")))?;
        let conn = Connection::open_with_flags(path, config).map_err(|e| {
            Error::query(format!(
                "Failed to open DuckDB database '{}' read-only: {e}",
                path.display()
            ))
        })?;

        Ok(Some(Self {
            conn,
            path: Some(path.to_path_buf()),
        }))
    }

    /// Where the store lives (for logging)
    pub fn location(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
    }

    /// Close the connection, reporting any error
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::load(format!("Failed to close DuckDB connection: {e}")))
    }

    /// Replace the contents of `table` with `batch`
    ///
    /// Drop, recreate and inserts share one transaction: on failure the
    /// previous table is left as it was. After commit one row is read back
    /// to confirm the store is readable.
    pub fn load(&mut self, batch: &Batch, table: &str) -> Result<LoadReport> {
        check_loadable(batch)?;

        let target = quote_ident(table);
        let create_sql = create_table_sql(&target, batch);
        let insert_sql = insert_sql(&target, batch);
        let stamp = batch.loaded_at.format(SQL_TIMESTAMP_FORMAT).to_string();

        tracing::debug!("Replacing {} in {}: {}", table, self.location(), create_sql);

        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::load(format!("Failed to begin transaction: {e}")))?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {target}; {create_sql}"))
            .map_err(|e| Error::load(format!("Failed to recreate table '{table}': {e}")))?;

        {
            let mut stmt = tx
                .prepare(&insert_sql)
                .map_err(|e| Error::load(format!("Failed to prepare insert: {e}")))?;

            for (row, record) in batch.records.iter().enumerate() {
                let params = record
                    .values
                    .iter()
                    .map(cell_to_sql)
                    .chain(std::iter::once(duckdb::types::Value::Text(stamp.clone())));
                stmt.execute(params_from_iter(params)).map_err(|e| {
                    Error::load(format!("Failed to insert row {}: {e}", row + 1))
                })?;
            }
        }

        tx.commit()
            .map_err(|e| Error::load(format!("Failed to commit load of '{table}': {e}")))?;

        let rows_loaded = self
            .row_count(table)
            .map_err(|e| Error::load(format!("Read-back of '{table}' failed: {e}")))?;
        let sample = self
            .sample_row(table)
            .map_err(|e| Error::load(format!("Read-back of '{table}' failed: {e}")))?;

        tracing::info!("Loaded {} records into {}", rows_loaded, table);

        Ok(LoadReport {
            table: table.to_string(),
            rows_loaded,
            loaded_at: batch.loaded_at,
            sample,
        })
    }

    /// Whether a table exists in the main schema
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
                params![table],
                |row| row.get(0),
            )
            .map_err(|e| Error::query(format!("Failed to look up table '{table}': {e}")))?;
        Ok(count > 0)
    }

    /// Column names of a table in declaration order
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT column_name FROM information_schema.columns
                 WHERE table_name = ? ORDER BY ordinal_position",
            )
            .map_err(|e| Error::query(format!("Failed to prepare query: {e}")))?;

        stmt.query_map(params![table], |row| row.get(0))
            .map_err(|e| Error::query(format!("Failed to list columns of '{table}': {e}")))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| Error::query(format!("Failed to read columns of '{table}': {e}")))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::query(format!("Failed to count rows of '{table}': {e}")))?;
        Ok(count as usize)
    }

    /// First row of a table, if any
    pub fn sample_row(&self, table: &str) -> Result<Option<JsonObject>> {
        let sql = format!("SELECT * FROM {} LIMIT 1", quote_ident(table));
        Ok(self.query_objects(&sql)?.into_iter().next())
    }

    /// Every row of a table in storage order
    pub fn all_records(&self, table: &str) -> Result<Vec<JsonObject>> {
        self.query_objects(&format!("SELECT * FROM {}", quote_ident(table)))
    }

    /// Run a read-only query and return each row as a JSON object
    pub fn query_objects(&self, sql: &str) -> Result<Vec<JsonObject>> {
        tracing::debug!("Executing query: {}", sql);

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::query(format!("Failed to prepare query: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::query(format!("Query failed: {e}")))?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default();

        let mut objects = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::query(format!("Failed to read row: {e}")))?
        {
            let mut obj = JsonObject::new();
            for (idx, name) in columns.iter().enumerate() {
                let value: duckdb::types::Value = row
                    .get(idx)
                    .map_err(|e| Error::query(format!("Failed to read column '{name}': {e}")))?;
                obj.insert(name.clone(), duckdb_value_to_json(value));
            }
            objects.push(obj);
        }

        Ok(objects)
    }
}

/// Quote an identifier for DuckDB
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reject batches whose column names the store cannot hold
///
/// DuckDB identifiers are case-insensitive, so `Cold` and `cold` collide.
fn check_loadable(batch: &Batch) -> Result<()> {
    let mut seen = HashSet::new();
    let names = batch
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .chain(std::iter::once(batch.loaded_at_column.as_str()));

    for name in names {
        if name.is_empty() {
            return Err(Error::load(
                "a header normalizes to an empty column name",
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(Error::load(format!("duplicate column name '{name}'")));
        }
    }
    Ok(())
}

fn create_table_sql(target: &str, batch: &Batch) -> String {
    let mut columns: Vec<String> = batch
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect();
    columns.push(format!("{} TIMESTAMP", quote_ident(&batch.loaded_at_column)));
    format!("CREATE TABLE {target} ({});", columns.join(", "))
}

fn insert_sql(target: &str, batch: &Batch) -> String {
    let mut placeholders = vec!["?"; batch.columns.len()];
    placeholders.push("CAST(? AS TIMESTAMP)");
    format!("INSERT INTO {target} VALUES ({})", placeholders.join(", "))
}
