//! Extract stage
//!
//! Reads the source file, resolves its text encoding and parses it into a
//! [`RawTable`](crate::types::RawTable).
//!
//! # Overview
//!
//! Decoding tries UTF-8 first and falls back to windows-1252. No other
//! encodings are attempted.

mod encoding;
mod reader;

pub use encoding::{decode_source, read_source, DecodedSource};
pub use reader::parse_csv;

use crate::error::Result;
use crate::types::RawTable;
use std::path::Path;

/// Read, decode and parse a CSV file
pub fn extract(path: impl AsRef<Path>) -> Result<RawTable> {
    let source = read_source(path)?;
    parse_csv(&source.text)
}

/// Decode and parse CSV bytes already in memory
pub fn extract_bytes(bytes: &[u8], source_name: &str) -> Result<RawTable> {
    let source = decode_source(bytes, source_name)?;
    parse_csv(&source.text)
}
