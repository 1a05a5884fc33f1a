//! CSV parsing into raw tables

use crate::error::{Error, Result};
use crate::types::RawTable;

/// Parse CSV text with a header row
///
/// Short rows are padded with missing cells and surplus cells are ignored,
/// so every row lines up with the header.
pub fn parse_csv(text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(Error::csv("missing header row"));
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::csv(format!("row {}: {e}", line + 1)))?;
        if record.len() > headers.len() {
            tracing::debug!(
                "row {} has {} cells, ignoring those past column {}",
                line + 1,
                record.len(),
                headers.len()
            );
        }
        let row = (0..headers.len())
            .map(|i| record.get(i).map(String::from))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
