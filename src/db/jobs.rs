//! Database queries for ingestion jobs.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::job::{self, ActiveModel, Column, Entity as Job};
use crate::error::{AppError, AppResult};
use crate::models::{JobStatus, JobUpdate};

use super::DbPool;

impl DbPool {
    /// Insert a new job in `pending` state with zeroed counters.
    ///
    /// The returned id goes back to the uploader before any row is read.
    pub async fn insert_job(&self, id: Uuid) -> AppResult<job::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(id),
            status: Set(JobStatus::Pending.as_str().to_string()),
            progress: Set(0),
            total_rows: Set(0),
            processed_rows: Set(0),
            error_message: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert job: {}", e)))?;

        Ok(result)
    }

    /// Get a job by ID.
    pub async fn get_job_by_id(&self, id: Uuid) -> AppResult<Option<job::Model>> {
        let result = Job::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job: {}", e)))?;

        Ok(result)
    }

    /// Apply a partial update to a job. Fields left as `None` are untouched.
    ///
    /// One call per processed row during ingestion, so this stays a single
    /// keyed UPDATE and does not serialize unrelated jobs. A job that already
    /// reached a terminal status is never moved out of it.
    pub async fn apply_job_update(&self, id: Uuid, update: JobUpdate) -> AppResult<job::Model> {
        let job = self
            .get_job_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {}", id)))?;

        let current = JobStatus::parse(&job.status);
        if let Some(current) = current
            && current.is_terminal()
            && update.status.is_some_and(|s| s != current)
        {
            tracing::warn!(
                "Ignoring status change for terminal job {} ({} -> {})",
                id,
                current,
                update.status.unwrap_or(current)
            );
            return Ok(job);
        }

        let mut active: ActiveModel = job.into();
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(progress) = update.progress {
            active.progress = Set(progress);
        }
        if let Some(total_rows) = update.total_rows {
            active.total_rows = Set(total_rows);
        }
        if let Some(processed_rows) = update.processed_rows {
            active.processed_rows = Set(processed_rows);
        }
        if let Some(error_message) = update.error_message {
            active.error_message = Set(Some(error_message));
        }
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update job: {}", e)))?;

        Ok(result)
    }

    /// List all jobs, newest first.
    pub async fn list_jobs(&self) -> AppResult<Vec<job::Model>> {
        let result = Job::find()
            .order_by_desc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list jobs: {}", e)))?;

        Ok(result)
    }

    /// Find non-terminal jobs whose last update is older than the cutoff.
    ///
    /// Used by the sweeper to fail runs orphaned by a crash.
    pub async fn find_stale_jobs(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> AppResult<Vec<job::Model>> {
        let result = Job::find()
            .filter(
                Column::Status.is_in([
                    JobStatus::Pending.as_str(),
                    JobStatus::Processing.as_str(),
                ]),
            )
            .filter(Column::UpdatedAt.lt(cutoff))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find stale jobs: {}", e)))?;

        Ok(result)
    }
}
