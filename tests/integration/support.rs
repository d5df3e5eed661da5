//! In-memory ingest store used by the pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use ngo_portal_lib::error::{AppError, AppResult};
use ngo_portal_lib::models::{JobStatus, JobUpdate, ReportRecord};
use ngo_portal_lib::services::IngestStore;

/// Natural key for the in-memory report map.
pub type NaturalKey = (String, String, i32);

/// In-memory store recording every job update in order.
#[derive(Default)]
pub struct MemStore {
    pub reports: Mutex<HashMap<NaturalKey, ReportRecord>>,
    pub updates: Mutex<Vec<JobUpdate>>,
    /// Upserts for this NGO id fail, simulating a per-row write error.
    pub fail_ngo: Option<String>,
    /// Artificial latency per upsert, for cancellation/deadline tests.
    pub upsert_delay: Option<Duration>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(ngo_id: &str) -> Self {
        MemStore {
            fail_ngo: Some(ngo_id.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        MemStore {
            upsert_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<JobUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn report(&self, ngo_id: &str, month: &str, year: i32) -> Option<ReportRecord> {
        self.reports
            .lock()
            .unwrap()
            .get(&(ngo_id.to_string(), month.to_string(), year))
            .cloned()
    }
}

#[async_trait]
impl IngestStore for MemStore {
    async fn apply_job_update(&self, _job_id: Uuid, update: JobUpdate) -> AppResult<()> {
        self.updates.lock().unwrap().push(update);
        Ok(())
    }

    async fn upsert_report(&self, record: &ReportRecord) -> AppResult<()> {
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_ngo.as_deref() == Some(record.ngo_id.as_str()) {
            return Err(AppError::Database("simulated write failure".to_string()));
        }
        let key = (
            record.ngo_id.clone(),
            record.month.as_str().to_string(),
            record.year,
        );
        self.reports.lock().unwrap().insert(key, record.clone());
        Ok(())
    }
}

/// The job record a poller would observe after the given update sequence.
#[derive(Debug, Default, Clone)]
pub struct JobView {
    pub status: Option<JobStatus>,
    pub progress: i32,
    pub total_rows: i32,
    pub processed_rows: i32,
    pub error_message: Option<String>,
}

/// Replay partial updates the way the job store applies them.
pub fn replay(updates: &[JobUpdate]) -> JobView {
    let mut view = JobView::default();
    for update in updates {
        if let Some(status) = update.status {
            view.status = Some(status);
        }
        if let Some(progress) = update.progress {
            view.progress = progress;
        }
        if let Some(total_rows) = update.total_rows {
            view.total_rows = total_rows;
        }
        if let Some(processed_rows) = update.processed_rows {
            view.processed_rows = processed_rows;
        }
        if let Some(ref message) = update.error_message {
            view.error_message = Some(message.clone());
        }
    }
    view
}
