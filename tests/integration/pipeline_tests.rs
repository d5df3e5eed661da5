//! Tests for the ingestion pipeline's terminal states and counters.

use uuid::Uuid;

use ngo_portal_lib::models::{JobStatus, Month, ValidationOutcome};
use ngo_portal_lib::services::ingest::{parse_csv, run_ingestion};

use crate::support::{MemStore, replay};

const HEADERS: &str = "NGO ID,Month,Year,People Helped,Events Conducted,Funds Utilized";

fn csv_with_rows(rows: &[&str]) -> Vec<u8> {
    let mut body = String::from(HEADERS);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.into_bytes()
}

#[actix_rt::test]
async fn all_valid_rows_complete() {
    let store = MemStore::new();
    let buffer = csv_with_rows(&[
        "NGO001,January,2024,150,5,25000",
        "NGO002,March,2024,200,8,30000",
    ]);

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let view = replay(&store.updates());
    assert_eq!(view.status, Some(JobStatus::Completed));
    assert_eq!(view.progress, 100);
    assert_eq!(view.total_rows, 2);
    assert_eq!(view.processed_rows, 2);
    assert_eq!(view.error_message, None);

    let stored = store.report("NGO002", "March", 2024).expect("persisted");
    assert_eq!(stored.people_helped, 200);
    assert_eq!(stored.funds_utilized, 30000.0);
}

#[actix_rt::test]
async fn scenario_mixed_rows_completes_with_errors() {
    let store = MemStore::new();
    // Row 2 has a bad month, row 3 an out-of-range year
    let buffer = csv_with_rows(&[
        "NGO001,January,2024,150,5,25000",
        "NGO002,Marchh,2024,200,8,30000",
        "NGO003,March,2019,10,1,100",
    ]);

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let view = replay(&store.updates());
    assert_eq!(view.status, Some(JobStatus::CompletedWithErrors));
    assert_eq!(view.progress, 100);
    assert_eq!(view.total_rows, 3);
    assert_eq!(view.processed_rows, 1);

    let outcome: ValidationOutcome =
        serde_json::from_str(&view.error_message.expect("embedded validation report"))
            .expect("valid JSON");
    assert_eq!(outcome.total_rows, 3);
    assert_eq!(outcome.valid_rows, 1);
    assert_eq!(outcome.invalid_rows, 2);
    assert_eq!(outcome.successful_rows, 1);
    assert_eq!(outcome.successful_rows + outcome.invalid_rows, outcome.total_rows);

    // Error entries stay in input order, numbered from the file's second line
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.errors[0].row_number, 3);
    assert!(outcome.errors[0].errors[0].starts_with("Invalid month: \"Marchh\""));
    assert_eq!(outcome.errors[0].data.get("Month").map(String::as_str), Some("Marchh"));
    assert_eq!(outcome.errors[1].row_number, 4);
    assert!(outcome.errors[1].errors[0].starts_with("Invalid year: 2019."));

    // Only the valid row was persisted
    assert!(store.report("NGO001", "January", 2024).is_some());
    assert!(store.report("NGO002", "Marchh", 2024).is_none());
    assert!(store.report("NGO003", "March", 2019).is_none());
}

#[actix_rt::test]
async fn progress_is_monotonically_non_decreasing() {
    let store = MemStore::new();
    let rows: Vec<String> = (1..=7)
        .map(|i| format!("NGO{:03},June,2024,{},1,50", i, i * 10))
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let buffer = csv_with_rows(&row_refs);

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let updates = store.updates();
    let mut last_progress = 0;
    let mut last_processed = 0;
    for update in &updates {
        if let Some(progress) = update.progress {
            assert!(progress >= last_progress, "progress regressed");
            last_progress = progress;
        }
        if let Some(processed) = update.processed_rows {
            assert!(processed >= last_processed, "processed_rows regressed");
            last_processed = processed;
        }
    }
    assert_eq!(last_progress, 100);
    assert_eq!(last_processed, 7);
}

#[actix_rt::test]
async fn empty_file_completes_with_zero_rows() {
    let store = MemStore::new();
    let buffer = csv_with_rows(&[]);

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let view = replay(&store.updates());
    assert_eq!(view.status, Some(JobStatus::Completed));
    assert_eq!(view.total_rows, 0);
    assert_eq!(view.processed_rows, 0);
    assert_eq!(view.progress, 100);
}

#[actix_rt::test]
async fn malformed_stream_fails_the_run() {
    let store = MemStore::new();
    // Invalid UTF-8 in a record is a stream error, fatal to the whole run
    let mut buffer = csv_with_rows(&["NGO001,January,2024,150,5,25000"]);
    buffer.push(b'\n');
    buffer.extend_from_slice(b"NGO002,\xff\xfe,2024,1,1,1");

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let view = replay(&store.updates());
    assert_eq!(view.status, Some(JobStatus::Failed));
    assert!(view.error_message.expect("failure description").contains("CSV"));
}

#[actix_rt::test]
async fn per_row_write_failure_skips_only_that_row() {
    let store = MemStore::failing_for("NGO002");
    let buffer = csv_with_rows(&[
        "NGO001,January,2024,150,5,25000",
        "NGO002,January,2024,200,8,30000",
        "NGO003,January,2024,10,1,100",
    ]);

    run_ingestion(&store, Uuid::new_v4(), &buffer).await;

    let view = replay(&store.updates());
    // No validation errors, so the run still completes
    assert_eq!(view.status, Some(JobStatus::Completed));
    assert_eq!(view.total_rows, 3);
    // The failed write counts toward neither processed nor successful rows
    assert_eq!(view.processed_rows, 2);

    assert!(store.report("NGO001", "January", 2024).is_some());
    assert!(store.report("NGO002", "January", 2024).is_none());
    assert!(store.report("NGO003", "January", 2024).is_some());
}

#[actix_rt::test]
async fn resubmission_overwrites_by_natural_key() {
    let store = MemStore::new();

    let first = csv_with_rows(&["NGO001,January,2024,150,5,25000"]);
    run_ingestion(&store, Uuid::new_v4(), &first).await;

    let second = csv_with_rows(&["NGO001,January,2024,200,5,25000"]);
    run_ingestion(&store, Uuid::new_v4(), &second).await;

    assert_eq!(store.reports.lock().unwrap().len(), 1);
    let stored = store.report("NGO001", "January", 2024).expect("persisted");
    assert_eq!(stored.people_helped, 200);
}

#[test]
fn parse_csv_preserves_input_order_and_counts() {
    let buffer = csv_with_rows(&[
        "NGO001,January,2024,150,5,25000",
        ",February,2024,1,1,1",
        "NGO003,March,2024,10,1,100",
    ]);

    let parsed = parse_csv(&buffer).expect("parseable");
    assert_eq!(parsed.total_rows, 3);
    assert_eq!(parsed.valid.len(), 2);
    assert_eq!(parsed.valid[0].ngo_id, "NGO001");
    assert_eq!(parsed.valid[1].ngo_id, "NGO003");
    assert_eq!(parsed.invalid.len(), 1);
    assert_eq!(parsed.invalid[0].row_number, 3);
    assert_eq!(parsed.invalid[0].errors, vec!["NGO ID is required"]);
}

#[test]
fn parse_csv_tolerates_short_rows() {
    // Missing trailing cells surface as missing-field errors on that row,
    // not as a stream failure
    let buffer = csv_with_rows(&["NGO001,January,2024", "NGO002,March,2024,200,8,30000"]);

    let parsed = parse_csv(&buffer).expect("parseable");
    assert_eq!(parsed.total_rows, 2);
    assert_eq!(parsed.valid.len(), 1);
    assert_eq!(parsed.invalid.len(), 1);
    assert_eq!(parsed.invalid[0].row_number, 2);
    assert_eq!(parsed.invalid[0].errors.len(), 3);
}

#[test]
fn parse_csv_normalizes_header_spacing() {
    let buffer =
        b"  NGO ID , Month , Year , People Helped , Events Conducted , Funds Utilized \nNGO001,January,2024,150,5,25000"
            .to_vec();

    let parsed = parse_csv(&buffer).expect("parseable");
    assert_eq!(parsed.total_rows, 1);
    assert_eq!(parsed.valid.len(), 1);
    assert_eq!(parsed.valid[0].month, Month::January);
}
