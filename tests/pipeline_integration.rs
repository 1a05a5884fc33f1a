//! End-to-end tests: CSV file → pipeline → DuckDB → metrics endpoint

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use health_warehouse::cli::{router, ServerConfig};
use health_warehouse::{CoercionKind, ColumnRules, Error, Pipeline, PipelineConfig, Warehouse};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

fn config_in(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::default().with_database(dir.path().join("health_warehouse.db"))
}

fn write_csv(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

async fn fetch_metrics(config: PipelineConfig) -> Value {
    let response = router(ServerConfig::new(config))
        .oneshot(
            Request::builder()
                .uri("/api/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn find_by_type<'a>(rows: &'a [Value], type_value: f64) -> &'a Value {
    rows.iter()
        .find(|r| r["Type"].as_f64() == Some(type_value))
        .unwrap_or_else(|| panic!("no row for Type {type_value}"))
}

#[tokio::test]
async fn test_csv_to_metrics_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let csv = write_csv(
        &dir,
        "health_data.csv",
        b"Type,Temperature,Dehydration\n1,101.2,TRUE\n2,bad,FALSE\n",
    );

    let stamp = NaiveDate::from_ymd_opt(2024, 7, 4)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let outcome = Pipeline::new(config.clone())
        .unwrap()
        .run_at(&csv, stamp)
        .unwrap();
    assert_eq!(outcome.load.rows_loaded, 2);
    outcome.warehouse.close().unwrap();

    let body = fetch_metrics(config).await;

    let counts = body["severity_counts"].as_array().unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(find_by_type(counts, 1.0)["count"], json!(1));
    assert_eq!(find_by_type(counts, 2.0)["count"], json!(1));

    let vitals = body["vitals_by_type"].as_array().unwrap();
    assert_eq!(find_by_type(vitals, 1.0)["avg_temperature"], json!(101.2));
    assert!(find_by_type(vitals, 2.0)["avg_temperature"].is_null());
    assert!(find_by_type(vitals, 1.0)["avg_heart_rate"].is_null());

    let records = body["all_records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Dehydration"], json!(1));
    assert_eq!(records[1]["Dehydration"], json!(0));
    assert!(records[1]["Temperature"].is_null());
    assert_eq!(records[0]["loaded_at"], "2024-07-04T10:00:00.000000");
    assert_eq!(records[0]["loaded_at"], records[1]["loaded_at"]);
}

#[test]
fn test_second_load_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_in(&dir)).unwrap();
    let batch_a = write_csv(&dir, "a.csv", b"Type,Pulse\n1,60\n2,70\n3,80\n");
    let batch_b = write_csv(&dir, "b.csv", b"Type,Pulse\n1,61\n2,71\n");

    pipeline.run(&batch_a).unwrap().warehouse.close().unwrap();
    let outcome = pipeline.run(&batch_b).unwrap();

    assert_eq!(outcome.load.rows_loaded, 2);
    let records = outcome.warehouse.all_records("health_metrics").unwrap();
    let pulses: Vec<f64> = records
        .iter()
        .map(|r| r["Pulse"].as_f64().unwrap())
        .collect();
    assert_eq!(pulses, vec![61.0, 71.0]);
}

#[tokio::test]
async fn test_rejected_batch_keeps_previous_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let pipeline = Pipeline::new(config.clone()).unwrap();
    let good = write_csv(&dir, "good.csv", b"Type,Cough\n1,TRUE\n");
    let bad = write_csv(&dir, "bad.csv", b"Kind,Cough\n1,TRUE\n2,FALSE\n");

    pipeline.run(&good).unwrap().warehouse.close().unwrap();
    let err = pipeline.run(&bad).unwrap_err();
    assert!(matches!(err, Error::Schema { .. }));

    let body = fetch_metrics(config).await;
    assert_eq!(body["all_records"].as_array().unwrap().len(), 1);
}

#[test]
fn test_windows_1252_export_loads() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_in(&dir)).unwrap();
    // "Temperature °F" header and a "Notes" cell in windows-1252
    let csv = write_csv(
        &dir,
        "legacy.csv",
        b"Type,Temperature \xB0F,Notes\n1,99.5,na\xEFve\n",
    );

    let outcome = pipeline.run(&csv).unwrap();
    assert_eq!(
        outcome.batch.column_names(),
        vec!["Type", "Temperature_F", "Notes"]
    );

    let reader_view = outcome.warehouse.all_records("health_metrics").unwrap();
    assert_eq!(reader_view[0]["Notes"], "na\u{ef}ve");
    drop(outcome);

    let reopened = Warehouse::open_read_only(dir.path().join("health_warehouse.db"))
        .unwrap()
        .unwrap();
    assert_eq!(reopened.row_count("health_metrics").unwrap(), 1);
}

#[tokio::test]
async fn test_alternate_column_rules() {
    let dir = tempfile::tempdir().unwrap();
    let rules = ColumnRules::from_kinds([
        ("Type", CoercionKind::Numeric),
        ("Weight", CoercionKind::Numeric),
        ("Fever", CoercionKind::Boolean),
    ]);
    let mut config = config_in(&dir).with_columns(rules).with_table("triage");
    config.vitals = vec!["Weight".to_string()];

    let csv = write_csv(
        &dir,
        "triage.csv",
        b"Type,Weight,Fever,Temperature\n1,70.5,TRUE,98.6\n1,80.5,yes,99.1\n",
    );
    Pipeline::new(config.clone())
        .unwrap()
        .run(&csv)
        .unwrap()
        .warehouse
        .close()
        .unwrap();

    let body = fetch_metrics(config).await;
    let vitals = body["vitals_by_type"].as_array().unwrap();
    assert_eq!(vitals[0]["avg_weight"], json!(75.5));

    let records = body["all_records"].as_array().unwrap();
    assert_eq!(records[0]["Fever"], json!(1));
    assert!(records[1]["Fever"].is_null());
    // no numeric rule for Temperature under these settings
    assert_eq!(records[0]["Temperature"], "98.6");
}
