//! Pipeline tests

use super::*;
use crate::error::Error;
use crate::types::CellValue;
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn setup() -> (TempDir, Pipeline) {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default().with_database(dir.path().join("warehouse.db"));
    (dir, Pipeline::new(config).unwrap())
}

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = PipelineConfig::default().with_table("");
    assert!(matches!(Pipeline::new(config), Err(Error::Config { .. })));
}

#[test]
fn test_run_end_to_end() {
    let (dir, pipeline) = setup();
    let csv = write(
        &dir,
        "health_data.csv",
        b"Type,Temperature,Dehydration\n1,101.2,TRUE\n2,bad,FALSE\n",
    );

    let outcome = pipeline.run_at(&csv, stamp()).unwrap();

    assert_eq!(outcome.load.rows_loaded, 2);
    assert_eq!(outcome.batch.value(1, "Temperature"), Some(&CellValue::Number(None)));
    assert_eq!(outcome.batch.loaded_at, stamp());
    assert_eq!(outcome.warehouse.row_count("health_metrics").unwrap(), 2);
    outcome.warehouse.close().unwrap();
}

#[test]
fn test_schema_error_leaves_store_unchanged() {
    let (dir, pipeline) = setup();
    let good = write(&dir, "good.csv", b"Type,Cold\n1,TRUE\n2,FALSE\n3,TRUE\n");
    let bad = write(&dir, "bad.csv", b"Severity,Cold\n1,TRUE\n");

    pipeline.run_at(&good, stamp()).unwrap().warehouse.close().unwrap();

    let err = pipeline.run_at(&bad, stamp()).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.is_pre_load());

    let reader = Warehouse::open_read_only(&pipeline.config().database)
        .unwrap()
        .unwrap();
    assert_eq!(reader.row_count("health_metrics").unwrap(), 3);
}

#[test]
fn test_schema_error_without_prior_load_creates_nothing() {
    let (dir, pipeline) = setup();
    let bad = write(&dir, "bad.csv", b"Temperature\n98.6\n");

    assert!(pipeline.run_at(&bad, stamp()).is_err());
    assert!(!pipeline.config().database.exists());
}

#[test]
fn test_windows_1252_file_loads() {
    let (dir, pipeline) = setup();
    let latin = write(&dir, "latin.csv", b"Type,Notes\n1,fi\xE8vre\n2,toux\n");
    let clean = write(&dir, "clean.csv", "Type,Notes\n1,fièvre\n2,toux\n".as_bytes());

    let from_latin = pipeline.extract_and_transform_at(&latin, stamp()).unwrap();
    let from_clean = pipeline.extract_and_transform_at(&clean, stamp()).unwrap();

    assert_eq!(from_latin.columns, from_clean.columns);
    assert_eq!(from_latin.len(), from_clean.len());
    assert_eq!(from_latin.records, from_clean.records);
}

#[test]
fn test_summary_uses_config() {
    let (dir, pipeline) = setup();
    let csv = write(&dir, "data.csv", b"Type,Temperature,Pulse\n1,98,60\n1,99,62\n");

    let batch = pipeline.extract_and_transform_at(&csv, stamp()).unwrap();
    let summary = pipeline.summary(&batch);

    assert_eq!(summary.distribution, vec![("1".to_string(), 2)]);
    let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
    assert_eq!(names, vec!["Temperature", "Pulse"]);
}
