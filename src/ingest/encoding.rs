//! Encoding resolution for source files

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Source text together with the encoding it was decoded with
#[derive(Debug, Clone)]
pub struct DecodedSource {
    /// Decoded text
    pub text: String,
    /// Encoding that succeeded
    pub encoding: &'static Encoding,
}

impl DecodedSource {
    /// Whether the windows-1252 fallback was needed
    pub fn fell_back(&self) -> bool {
        self.encoding != UTF_8
    }
}

/// Read a file and decode it
pub fn read_source(path: impl AsRef<Path>) -> Result<DecodedSource> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    decode_source(&bytes, &path.display().to_string())
}

/// Decode bytes as UTF-8, falling back to windows-1252
///
/// A leading UTF-8 byte-order mark is dropped. Neither attempt replaces
/// malformed sequences; a failed attempt moves on to the next encoding.
pub fn decode_source(bytes: &[u8], source_name: &str) -> Result<DecodedSource> {
    let unmarked = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(unmarked) {
        return Ok(DecodedSource {
            text: text.into_owned(),
            encoding: UTF_8,
        });
    }

    tracing::warn!(
        "UTF-8 decoding of '{}' failed, trying {}",
        source_name,
        WINDOWS_1252.name()
    );

    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| DecodedSource {
            text: text.into_owned(),
            encoding: WINDOWS_1252,
        })
        .ok_or_else(|| Error::encoding(source_name))
}
