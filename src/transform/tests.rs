//! Transform stage tests

use super::*;
use crate::error::Error;
use crate::types::{CellValue, ColumnType};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
}

fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable {
        headers: headers.iter().map(|h| (*h).to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| Some((*c).to_string())).collect())
            .collect(),
    }
}

// ============================================================================
// Normalization
// ============================================================================

#[test_case(" Heart Rate! ", "Heart_Rate" ; "trim and punctuation")]
#[test_case("Oxygen  Saturation", "Oxygen_Saturation" ; "whitespace run")]
#[test_case("Blood\tPressure\nSys", "Blood_Pressure_Sys" ; "mixed whitespace")]
#[test_case("BP (SYS)", "BP_SYS" ; "brackets")]
#[test_case("Type", "Type" ; "already canonical")]
#[test_case("pH", "pH" ; "case preserved")]
#[test_case("Temp °F", "Temp_F" ; "non ascii dropped")]
#[test_case("!!!", "" ; "degenerate empty")]
fn test_canonicalize(input: &str, expected: &str) {
    assert_eq!(canonicalize(input), expected);
}

#[test_case(" Heart Rate! ")]
#[test_case("  a  b  c  ")]
#[test_case("Medicine Overdose?")]
#[test_case("__x__ y")]
#[test_case("")]
fn test_canonicalize_idempotent(input: &str) {
    let once = canonicalize(input);
    assert_eq!(canonicalize(&once), once);
}

#[test]
fn test_normalize_keeps_order_and_duplicates() {
    let names = normalize_headers(&["Cold ", "Type", " Cold"]);
    assert_eq!(names, vec!["Cold", "Type", "Cold"]);
}

// ============================================================================
// Coercion
// ============================================================================

#[test_case(Some("TRUE"), Some(1) ; "true literal")]
#[test_case(Some("FALSE"), Some(0) ; "false literal")]
#[test_case(Some("true"), None ; "lowercase")]
#[test_case(Some("1"), None ; "numeric text")]
#[test_case(Some(""), None ; "blank")]
#[test_case(Some(" TRUE"), None ; "padded")]
#[test_case(None, None ; "missing")]
fn test_coerce_boolean(raw: Option<&str>, expected: Option<i64>) {
    assert_eq!(coerce_boolean(raw), expected);
}

#[test_case(Some("98.6"), Some(98.6) ; "decimal")]
#[test_case(Some("3"), Some(3.0) ; "integer")]
#[test_case(Some(" 7.25 "), Some(7.25) ; "padded")]
#[test_case(Some("-1e2"), Some(-100.0) ; "exponent")]
#[test_case(Some("abc"), None ; "garbage")]
#[test_case(Some(""), None ; "blank")]
#[test_case(Some("NaN"), None ; "nan")]
#[test_case(None, None ; "missing")]
fn test_coerce_numeric(raw: Option<&str>, expected: Option<f64>) {
    assert_eq!(coerce_numeric(raw), expected);
}

#[test]
fn test_coerce_cell_boolean_then_numeric() {
    let kinds = [CoercionKind::Boolean, CoercionKind::Numeric];
    assert_eq!(coerce_cell(Some("TRUE"), &kinds), CellValue::Number(Some(1.0)));
    assert_eq!(coerce_cell(Some("2.5"), &kinds), CellValue::Number(None));
}

#[test]
fn test_coerce_cell_without_rules_passes_text() {
    assert_eq!(
        coerce_cell(Some(" as-is "), &[]),
        CellValue::Text(Some(" as-is ".to_string()))
    );
    assert_eq!(coerce_cell(None, &[]), CellValue::Text(None));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_requires_discriminant() {
    assert!(validate_columns(&["Type", "Cold"], "Type").is_ok());

    let err = validate_columns(&["type", "Cold"], "Type").unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.to_string().contains("'Type'"));
}

// ============================================================================
// Transformer
// ============================================================================

#[test]
fn test_transform_example_batch() {
    let table = raw(
        &["Type", "Temperature", "Dehydration"],
        &[&["1", "101.2", "TRUE"], &["2", "bad", "FALSE"]],
    );

    let batch = Transformer::default().transform(&table, stamp()).unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.column_names(), vec!["Type", "Temperature", "Dehydration"]);
    assert_eq!(
        batch.records[0].values,
        vec![
            CellValue::Number(Some(1.0)),
            CellValue::Number(Some(101.2)),
            CellValue::Integer(Some(1)),
        ]
    );
    assert_eq!(
        batch.records[1].values,
        vec![
            CellValue::Number(Some(2.0)),
            CellValue::Number(None),
            CellValue::Integer(Some(0)),
        ]
    );
    assert_eq!(batch.loaded_at, stamp());
}

#[test]
fn test_transform_column_types() {
    let table = raw(&["Type", "Cough", "Patient Name"], &[&["1", "TRUE", "Ann"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();

    let types: Vec<ColumnType> = batch.columns.iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        vec![ColumnType::Number, ColumnType::Integer, ColumnType::Text]
    );
    assert_eq!(batch.columns[2].name, "Patient_Name");
    assert_eq!(
        batch.value(0, "Patient_Name"),
        Some(&CellValue::Text(Some("Ann".to_string())))
    );
}

#[test]
fn test_transform_normalizes_before_matching_rules() {
    let table = raw(&[" Type ", "Heart Rate", "Medicine Overdose"], &[&["3", "88", "FALSE"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();

    assert_eq!(batch.value(0, "Heart_Rate"), Some(&CellValue::Number(Some(88.0))));
    assert_eq!(
        batch.value(0, "Medicine_Overdose"),
        Some(&CellValue::Integer(Some(0)))
    );
}

#[test]
fn test_transform_rejects_missing_discriminant() {
    let table = raw(&["Severity", "Temperature"], &[&["1", "99.0"]]);
    let err = Transformer::default().transform(&table, stamp()).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
}

#[test]
fn test_transform_accepts_null_discriminant_value() {
    let table = raw(&["Type"], &[&["severe"], &["2"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();
    assert_eq!(batch.value(0, "Type"), Some(&CellValue::Number(None)));
    assert_eq!(batch.value(1, "Type"), Some(&CellValue::Number(Some(2.0))));
}

#[test]
fn test_transform_missing_cells_are_null() {
    let table = RawTable {
        headers: vec!["Type".into(), "Cold".into(), "Notes".into()],
        rows: vec![vec![Some("1".into()), None, None]],
    };
    let batch = Transformer::default().transform(&table, stamp()).unwrap();
    assert_eq!(batch.value(0, "Cold"), Some(&CellValue::Integer(None)));
    assert_eq!(batch.value(0, "Notes"), Some(&CellValue::Text(None)));
    assert!(batch.records[0].values[1..].iter().all(CellValue::is_null));
}

#[test]
fn test_transform_preserves_row_order() {
    let table = raw(&["Type"], &[&["3"], &["1"], &["2"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();
    let order: Vec<Option<f64>> = batch
        .column_values("Type")
        .unwrap()
        .map(CellValue::as_f64)
        .collect();
    assert_eq!(order, vec![Some(3.0), Some(1.0), Some(2.0)]);
}

#[test]
fn test_transform_drops_source_loaded_at() {
    let table = raw(&["Type", "loaded at"], &[&["1", "yesterday"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();
    assert_eq!(batch.column_names(), vec!["Type"]);

    let json = batch.record_json(0).unwrap();
    assert_eq!(json["loaded_at"], "2024-03-01T12:30:00.000000");
}

#[test]
fn test_transform_drops_source_loaded_at_in_any_case() {
    let table = raw(&["Type", "Loaded At"], &[&["1", "yesterday"]]);
    let batch = Transformer::default().transform(&table, stamp()).unwrap();
    assert_eq!(batch.column_names(), vec!["Type"]);
}

#[test]
fn test_transform_stamp_named_like_discriminant_is_rejected() {
    let transformer = Transformer::new(ColumnRules::default(), "Type", "Type");
    let table = raw(&["Type", "Cold"], &[&["1", "TRUE"]]);

    let err = transformer.transform(&table, stamp()).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
}

#[test]
fn test_transform_with_alternate_rules() {
    let rules = ColumnRules::from_kinds([
        ("Category", CoercionKind::Numeric),
        ("Fever", CoercionKind::Boolean),
    ]);
    let transformer = Transformer::new(rules, "Category", "ingested_at");
    let table = raw(&["Category", "Fever", "Temperature"], &[&["4", "TRUE", "98.6"]]);

    let batch = transformer.transform(&table, stamp()).unwrap();
    assert_eq!(batch.value(0, "Fever"), Some(&CellValue::Integer(Some(1))));
    // not ruled under these settings
    assert_eq!(
        batch.value(0, "Temperature"),
        Some(&CellValue::Text(Some("98.6".to_string())))
    );
    assert!(batch.record_json(0).unwrap().contains_key("ingested_at"));
}
