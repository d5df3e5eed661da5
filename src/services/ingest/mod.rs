//! CSV bulk-ingestion pipeline.
//!
//! A dispatched run streams the uploaded buffer row by row through the
//! validator, upserts each valid record, and advances the job's counters
//! after every row so pollers observe continuous progress. The caller gets
//! nothing back directly; the job record is the only observable outcome.

pub mod validator;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{JobUpdate, ReportRecord, RowError, ValidationOutcome};

/// Store operations the pipeline needs.
///
/// The handle is injected explicitly (no ambient connection); `DbPool`
/// implements this against PostgreSQL, tests run against an in-memory store.
#[async_trait]
pub trait IngestStore: Send + Sync {
    /// Apply a partial update to the job record.
    async fn apply_job_update(&self, job_id: Uuid, update: JobUpdate) -> AppResult<()>;

    /// Upsert a report by its natural key.
    async fn upsert_report(&self, record: &ReportRecord) -> AppResult<()>;
}

#[async_trait]
impl IngestStore for DbPool {
    async fn apply_job_update(&self, job_id: Uuid, update: JobUpdate) -> AppResult<()> {
        DbPool::apply_job_update(self, job_id, update).await?;
        Ok(())
    }

    async fn upsert_report(&self, record: &ReportRecord) -> AppResult<()> {
        DbPool::upsert_report(self, record).await?;
        Ok(())
    }
}

/// Everything learned from one pass over the CSV stream.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub total_rows: u32,
    /// Valid records, in input order.
    pub valid: Vec<ReportRecord>,
    /// Per-row error entries, in input order.
    pub invalid: Vec<RowError>,
}

/// Stream the buffer as comma-delimited text with a header row.
///
/// Headers are trimmed before alias matching; fields are trimmed. Short rows
/// are tolerated (missing cells surface as missing fields on that row).
/// A malformed stream (bad UTF-8, unreadable record) fails the whole run.
pub fn parse_csv(buffer: &[u8]) -> AppResult<ParsedCsv> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(buffer);

    let headers = reader.headers()?.clone();

    let mut total_rows: u32 = 0;
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for result in reader.records() {
        let record = result?;
        total_rows += 1;
        // +1 because the header occupies the first line of the file
        let row_number = total_rows + 1;

        let row: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.trim().to_string(), v.to_string()))
            .collect();

        match validator::validate_row(&row) {
            Ok(record) => valid.push(record),
            Err(errors) => invalid.push(RowError {
                row_number,
                errors,
                data: row,
            }),
        }
    }

    Ok(ParsedCsv {
        total_rows,
        valid,
        invalid,
    })
}

/// Run one ingestion to its terminal job state.
///
/// Any error escaping the pipeline is converted into a `failed` job record;
/// nothing propagates to the dispatcher. Rows upserted before a failure stay
/// persisted (at-least-once, not atomic).
pub async fn run_ingestion<S: IngestStore + ?Sized>(store: &S, job_id: Uuid, buffer: &[u8]) {
    if let Err(e) = ingest(store, job_id, buffer).await {
        error!("Ingestion failed for job {}: {}", job_id, e);
        let update = JobUpdate::failed(e.to_string());
        if let Err(update_err) = store.apply_job_update(job_id, update).await {
            error!(
                "Failed to record failure for job {}: {}",
                job_id, update_err
            );
        }
    }
}

async fn ingest<S: IngestStore + ?Sized>(store: &S, job_id: Uuid, buffer: &[u8]) -> AppResult<()> {
    let parsed = parse_csv(buffer)?;
    let total_rows = parsed.total_rows;

    // Row count is known only at EOF; progress percentages start here.
    store
        .apply_job_update(job_id, JobUpdate::processing(total_rows as i32))
        .await?;

    let mut processed_rows: u32 = 0;
    for record in &parsed.valid {
        match store.upsert_report(record).await {
            Ok(()) => {
                processed_rows += 1;
                let progress =
                    ((f64::from(processed_rows) / f64::from(total_rows)) * 100.0).round() as i32;
                // Persisted per row, not batched, so pollers see continuous
                // advancement.
                store
                    .apply_job_update(
                        job_id,
                        JobUpdate::row_processed(progress, processed_rows as i32),
                    )
                    .await?;
            }
            Err(e) => {
                // A single failed write does not abort the run and does not
                // count toward processed/successful rows.
                warn!(
                    "Skipping row for NGO {} ({} {}): {}",
                    record.ngo_id, record.month, record.year, e
                );
            }
        }
    }

    if parsed.invalid.is_empty() {
        store.apply_job_update(job_id, JobUpdate::completed()).await?;
        info!(
            "Job {} completed: all {} rows persisted",
            job_id, processed_rows
        );
    } else {
        let outcome = ValidationOutcome {
            total_rows,
            valid_rows: parsed.valid.len() as u32,
            invalid_rows: parsed.invalid.len() as u32,
            successful_rows: processed_rows,
            errors: parsed.invalid,
        };
        let report = serde_json::to_string(&outcome)?;
        store
            .apply_job_update(job_id, JobUpdate::completed_with_errors(report))
            .await?;
        info!(
            "Job {} completed with errors: {}/{} rows persisted, {} invalid",
            job_id, outcome.successful_rows, total_rows, outcome.invalid_rows
        );
    }

    Ok(())
}

/// Dispatches detached ingestion runs.
///
/// Wraps `tokio::spawn` with a cancellation-token registry keyed by job id
/// and an optional per-run deadline. Both default off: without a configured
/// deadline a run goes to completion, and nothing exposes cancellation to
/// clients.
#[derive(Clone)]
pub struct IngestRunner {
    tokens: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
    deadline: Option<Duration>,
}

impl IngestRunner {
    pub fn new(deadline: Option<Duration>) -> Self {
        IngestRunner {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            deadline,
        }
    }

    /// Dispatch a run without awaiting it. The optional semaphore permit is
    /// held for the run's lifetime to bound concurrent ingestions.
    pub fn spawn<S>(
        &self,
        store: Arc<S>,
        job_id: Uuid,
        buffer: Vec<u8>,
        permit: Option<OwnedSemaphorePermit>,
    ) where
        S: IngestStore + 'static,
    {
        let token = CancellationToken::new();
        self.tokens
            .write()
            .expect("ingest token registry poisoned")
            .insert(job_id, token.clone());

        let tokens = Arc::clone(&self.tokens);
        let deadline = self.deadline;

        tokio::spawn(async move {
            let _permit = permit;

            let work = run_with_deadline(Arc::clone(&store), job_id, buffer, deadline);
            tokio::select! {
                _ = token.cancelled() => {
                    warn!("Ingestion run cancelled for job {}", job_id);
                    let update = JobUpdate::failed("Ingestion cancelled".to_string());
                    if let Err(e) = store.apply_job_update(job_id, update).await {
                        error!("Failed to record cancellation for job {}: {}", job_id, e);
                    }
                }
                _ = work => {}
            }

            tokens
                .write()
                .expect("ingest token registry poisoned")
                .remove(&job_id);
        });
    }

    /// Cancel a running ingestion. Returns false if the job is not running.
    pub fn cancel(&self, job_id: Uuid) -> bool {
        let tokens = self.tokens.read().expect("ingest token registry poisoned");
        match tokens.get(&job_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

async fn run_with_deadline<S: IngestStore + ?Sized>(
    store: Arc<S>,
    job_id: Uuid,
    buffer: Vec<u8>,
    deadline: Option<Duration>,
) {
    match deadline {
        None => run_ingestion(&*store, job_id, &buffer).await,
        Some(limit) => {
            if tokio::time::timeout(limit, run_ingestion(&*store, job_id, &buffer))
                .await
                .is_err()
            {
                warn!(
                    "Ingestion run for job {} exceeded deadline of {}s",
                    job_id,
                    limit.as_secs()
                );
                let update = JobUpdate::failed(format!(
                    "Ingestion exceeded deadline of {}s",
                    limit.as_secs()
                ));
                if let Err(e) = store.apply_job_update(job_id, update).await {
                    error!("Failed to record deadline expiry for job {}: {}", job_id, e);
                }
            }
        }
    }
}
