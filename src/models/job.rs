//! Job domain models and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::job;

/// Job status enum.
///
/// `pending` -> `processing` -> one of the three terminal states.
/// A terminal status never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job created, CSV not yet streamed.
    Pending,
    /// Row count known, valid rows being upserted.
    Processing,
    /// Every row was valid and persisted.
    Completed,
    /// Run finished but some rows failed validation.
    CompletedWithErrors,
    /// Stream/parse failure, deadline, or cancellation.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "completed_with_errors" => Some(Self::CompletedWithErrors),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Pollers stop once they observe a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithErrors | Self::Failed
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial job update. Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<i32>,
    pub total_rows: Option<i32>,
    pub processed_rows: Option<i32>,
    pub error_message: Option<String>,
}

impl JobUpdate {
    /// Streaming finished: row count is known, upserts start now.
    pub fn processing(total_rows: i32) -> Self {
        JobUpdate {
            status: Some(JobStatus::Processing),
            progress: Some(0),
            total_rows: Some(total_rows),
            processed_rows: Some(0),
            ..Default::default()
        }
    }

    /// One more row persisted.
    pub fn row_processed(progress: i32, processed_rows: i32) -> Self {
        JobUpdate {
            status: Some(JobStatus::Processing),
            progress: Some(progress),
            processed_rows: Some(processed_rows),
            ..Default::default()
        }
    }

    pub fn completed() -> Self {
        JobUpdate {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            ..Default::default()
        }
    }

    pub fn completed_with_errors(validation_report: String) -> Self {
        JobUpdate {
            status: Some(JobStatus::CompletedWithErrors),
            progress: Some(100),
            error_message: Some(validation_report),
            ..Default::default()
        }
    }

    pub fn failed(message: String) -> Self {
        JobUpdate {
            status: Some(JobStatus::Failed),
            error_message: Some(message),
            ..Default::default()
        }
    }
}

/// Validation errors for one rejected CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RowError {
    /// 1-based file line number (the header row is line 1).
    pub row_number: u32,
    pub errors: Vec<String>,
    /// The raw row, keyed by the original header names.
    pub data: BTreeMap<String, String>,
}

/// Summary of one ingestion run, embedded in the terminal job record
/// when any row failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationOutcome {
    pub total_rows: u32,
    pub valid_rows: u32,
    pub invalid_rows: u32,
    /// Valid rows actually persisted; lower than valid_rows when a
    /// per-row database write failed.
    pub successful_rows: u32,
    pub errors: Vec<RowError>,
}

/// Response after accepting a CSV upload. Processing continues detached;
/// the caller polls the job-status endpoint to observe the outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadAcceptedResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Job snapshot returned by the status endpoint.
///
/// Clients poll this on a fixed interval (the bundled frontend uses 1 s)
/// until `status` is terminal, then stop.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: i32,
    pub total_rows: i32,
    pub processed_rows: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<job::Model> for JobStatusResponse {
    fn from(m: job::Model) -> Self {
        JobStatusResponse {
            job_id: m.id,
            // The CHECK constraint keeps stored statuses canonical
            status: JobStatus::parse(&m.status).unwrap_or(JobStatus::Failed),
            progress: m.progress,
            total_rows: m.total_rows,
            processed_rows: m.processed_rows,
            error_message: m.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::CompletedWithErrors,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("complete"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::CompletedWithErrors.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::CompletedWithErrors).unwrap();
        assert_eq!(json, "\"completed_with_errors\"");
    }

    #[test]
    fn test_partial_update_leaves_fields_untouched() {
        let update = JobUpdate::row_processed(40, 2);
        assert_eq!(update.total_rows, None);
        assert_eq!(update.error_message, None);
        assert_eq!(update.status, Some(JobStatus::Processing));
    }
}
