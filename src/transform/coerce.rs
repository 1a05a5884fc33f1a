//! Cell coercion
//!
//! Nothing in here fails. A value that does not fit its target type becomes
//! null, which downstream means "unknown", never zero.

use crate::types::{CellValue, CoercionKind};

/// Map the literals `TRUE` and `FALSE` to 1 and 0
pub fn coerce_boolean(raw: Option<&str>) -> Option<i64> {
    match raw {
        Some("TRUE") => Some(1),
        Some("FALSE") => Some(0),
        _ => None,
    }
}

/// Parse a floating-point value; blanks, garbage and NaN become null
pub fn coerce_numeric(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Apply one coercion to a cell
pub fn apply(kind: CoercionKind, value: CellValue) -> CellValue {
    match (kind, value) {
        (CoercionKind::Boolean, CellValue::Text(raw)) => {
            CellValue::Integer(coerce_boolean(raw.as_deref()))
        }
        (CoercionKind::Numeric, CellValue::Text(raw)) => {
            CellValue::Number(coerce_numeric(raw.as_deref()))
        }
        (CoercionKind::Numeric, CellValue::Integer(v)) => CellValue::Number(v.map(|i| i as f64)),
        // A boolean rule only understands the raw literals
        (CoercionKind::Boolean, CellValue::Integer(_) | CellValue::Number(_)) => {
            CellValue::Integer(None)
        }
        (CoercionKind::Numeric, number @ CellValue::Number(_)) => number,
    }
}

/// Apply a sequence of coercions to a raw cell
pub fn coerce_cell(raw: Option<&str>, kinds: &[CoercionKind]) -> CellValue {
    kinds
        .iter()
        .fold(CellValue::Text(raw.map(String::from)), |value, kind| {
            apply(*kind, value)
        })
}
