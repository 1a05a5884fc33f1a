//! Structural validation of a batch

use crate::error::{Error, Result};

/// Require the discriminant column among the canonical columns
///
/// Only presence is checked. Null discriminant values are accepted here.
pub fn validate_columns<S: AsRef<str>>(columns: &[S], discriminant: &str) -> Result<()> {
    if columns.iter().any(|c| c.as_ref() == discriminant) {
        Ok(())
    } else {
        Err(Error::schema(format!(
            "Missing '{discriminant}' column in the data"
        )))
    }
}
