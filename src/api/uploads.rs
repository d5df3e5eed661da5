//! CSV bulk upload and job status API handlers.
//!
//! The upload handler accepts the multipart CSV, creates the job record and
//! dispatches ingestion without awaiting it; the 202 response carries the job
//! id. Clients then poll the job-status endpoint on a fixed interval (the
//! bundled frontend uses 1 s) until they observe a terminal status.

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::StreamExt;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{JobStatus, JobStatusResponse, UploadAcceptedResponse};
use crate::services::IngestRunner;

/// Upload a CSV file for bulk report ingestion.
///
/// Returns 202 with the job id immediately; processing continues detached.
#[utoipa::path(
    post,
    path = "/api/v1/reports/upload",
    tag = "Uploads",
    responses(
        (status = 202, description = "Upload accepted for processing", body = UploadAcceptedResponse),
        (status = 400, description = "Missing or non-CSV file", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 503, description = "Too many concurrent uploads", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_csv(
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    runner: web::Data<IngestRunner>,
    max_upload_size: web::Data<usize>,
    ingest_semaphore: web::Data<Arc<Semaphore>>,
) -> AppResult<HttpResponse> {
    // Bound concurrent ingestions; the permit travels with the detached run.
    let permit = Arc::clone(ingest_semaphore.get_ref())
        .try_acquire_owned()
        .map_err(|_| {
            warn!("CSV upload rejected: too many concurrent ingestions");
            AppError::ServiceUnavailable(
                "Too many concurrent uploads. Please try again later.".to_string(),
            )
        })?;

    let max_size = *max_upload_size.get_ref();
    let mut csv_buffer: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        let Some(filename) = content_disposition.get_filename().map(str::to_string) else {
            // Non-file form fields are ignored
            continue;
        };

        let csv_content_type = field
            .content_type()
            .map(|m| m.essence_str() == "text/csv")
            .unwrap_or(false);
        if !csv_content_type && !filename.to_lowercase().ends_with(".csv") {
            drain_field(&mut field).await;
            return Err(AppError::InvalidInput(
                "Only CSV files are allowed".to_string(),
            ));
        }

        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if buffer.len() + data.len() > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "File too large. Maximum size is {} bytes.",
                    max_size
                )));
            }
            buffer.extend_from_slice(&data);
        }

        csv_buffer = Some(buffer);
        break;
    }

    let Some(buffer) = csv_buffer else {
        return Err(AppError::InvalidInput("No CSV file uploaded".to_string()));
    };

    // The job id goes back to the caller before any row is read.
    let job = pool.insert_job(Uuid::new_v4()).await?;

    info!(
        "CSV upload accepted: job {} created ({} bytes)",
        job.id,
        buffer.len()
    );

    runner.spawn(
        Arc::new(pool.get_ref().clone()),
        job.id,
        buffer,
        Some(permit),
    );

    Ok(HttpResponse::Accepted().json(UploadAcceptedResponse {
        job_id: job.id,
        status: JobStatus::Pending,
    }))
}

/// Get the status of an ingestion job.
///
/// Poll this until `status` is `completed`, `completed_with_errors` or
/// `failed`, then stop; a terminal status never changes again.
#[utoipa::path(
    get,
    path = "/api/v1/reports/job-status/{job_id}",
    tag = "Uploads",
    params(
        ("job_id" = Uuid, Path, description = "Job UUID")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = JobStatusResponse),
        (status = 404, description = "Job not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn job_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job_id = path.into_inner();

    let job = pool
        .get_job_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {}", job_id)))?;

    Ok(HttpResponse::Ok().json(JobStatusResponse::from(job)))
}

/// List all ingestion jobs, newest first (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/reports/jobs",
    tag = "Uploads",
    responses(
        (status = 200, description = "Jobs", body = Vec<JobStatusResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_jobs(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let jobs = pool.list_jobs().await?;
    let response: Vec<JobStatusResponse> = jobs.into_iter().map(JobStatusResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Drain a multipart field without saving.
async fn drain_field(field: &mut actix_multipart::Field) {
    while let Some(chunk) = field.next().await {
        let _ = chunk;
    }
}

/// Configure upload routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/reports/upload").route(web::post().to(upload_csv)))
        .service(web::resource("/reports/job-status/{job_id}").route(web::get().to(job_status)))
        .service(web::resource("/reports/jobs").route(web::get().to(list_jobs)));
}
