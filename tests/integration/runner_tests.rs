//! Tests for the ingest runner: detached dispatch, cancellation, deadline.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use ngo_portal_lib::models::JobStatus;
use ngo_portal_lib::services::IngestRunner;

use crate::support::{JobView, MemStore, replay};

const HEADERS: &str = "NGO ID,Month,Year,People Helped,Events Conducted,Funds Utilized";

fn csv_rows(n: usize) -> Vec<u8> {
    let mut body = String::from(HEADERS);
    for i in 1..=n {
        body.push_str(&format!("\nNGO{:03},June,2024,{},1,50", i, i * 10));
    }
    body.into_bytes()
}

/// Poll the store until the replayed view reaches a terminal status.
async fn wait_for_terminal(store: &MemStore, timeout: Duration) -> JobView {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let view = replay(&store.updates());
        if view.status.map(|s| s.is_terminal()).unwrap_or(false) {
            return view;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("job did not reach a terminal state within {:?}", timeout);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[actix_rt::test]
async fn spawned_run_reaches_completed() {
    let store = Arc::new(MemStore::new());
    let runner = IngestRunner::new(None);
    let job_id = Uuid::new_v4();

    runner.spawn(Arc::clone(&store), job_id, csv_rows(3), None);

    let view = wait_for_terminal(&store, Duration::from_secs(2)).await;
    assert_eq!(view.status, Some(JobStatus::Completed));
    assert_eq!(view.processed_rows, 3);

    // The token registry forgets finished runs
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!runner.cancel(job_id));
}

#[actix_rt::test]
async fn cancelled_run_is_marked_failed() {
    let store = Arc::new(MemStore::slow(Duration::from_millis(100)));
    let runner = IngestRunner::new(None);
    let job_id = Uuid::new_v4();

    runner.spawn(Arc::clone(&store), job_id, csv_rows(20), None);

    // Let the run get past a couple of rows, then cancel it
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(runner.cancel(job_id));

    let view = wait_for_terminal(&store, Duration::from_secs(2)).await;
    assert_eq!(view.status, Some(JobStatus::Failed));
    assert!(view.error_message.expect("failure description").contains("cancelled"));
}

#[actix_rt::test]
async fn deadline_expiry_is_marked_failed() {
    let store = Arc::new(MemStore::slow(Duration::from_millis(50)));
    let runner = IngestRunner::new(Some(Duration::from_millis(120)));
    let job_id = Uuid::new_v4();

    runner.spawn(Arc::clone(&store), job_id, csv_rows(20), None);

    let view = wait_for_terminal(&store, Duration::from_secs(2)).await;
    assert_eq!(view.status, Some(JobStatus::Failed));
    assert!(view.error_message.expect("failure description").contains("deadline"));
}

#[actix_rt::test]
async fn cancelling_unknown_job_is_a_no_op() {
    let runner = IngestRunner::new(None);
    assert!(!runner.cancel(Uuid::new_v4()));
}
