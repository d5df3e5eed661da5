//! Report API handlers: single submission, listing, dashboard.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    DashboardQuery, DashboardSummary, ListReportsQuery, Month, ReportResponse, SubmitReportRequest,
    report::current_year,
};

/// Submit a single report.
///
/// Validation runs synchronously with the same six rules as the bulk CSV
/// path. A resubmission for an existing (ngo_id, month, year) overwrites the
/// stored values and keeps the original created_at.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "Reports",
    request_body = SubmitReportRequest,
    responses(
        (status = 201, description = "Report persisted", body = ReportResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_report(
    pool: web::Data<DbPool>,
    body: web::Json<SubmitReportRequest>,
) -> AppResult<HttpResponse> {
    let record = body.into_inner().validate().map_err(AppError::Validation)?;

    let report = pool.upsert_report(&record).await?;

    info!(
        "Report submitted: ngo_id={}, month={}, year={}",
        report.ngo_id, report.month, report.year
    );

    Ok(HttpResponse::Created().json(ReportResponse::from(report)))
}

/// List reports, optionally filtered by month and/or year (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    params(
        ("month" = Option<String>, Query, description = "Canonical month name"),
        ("year" = Option<i32>, Query, description = "Calendar year"),
    ),
    responses(
        (status = 200, description = "Reports", body = Vec<ReportResponse>),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_reports(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<ListReportsQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let month = match query.month.as_deref() {
        Some(m) => Some(
            Month::parse(m).ok_or_else(|| AppError::InvalidInput("Invalid month".to_string()))?,
        ),
        None => None,
    };

    let reports = pool.list_reports(month, query.year).await?;
    let response: Vec<ReportResponse> = reports.into_iter().map(ReportResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Aggregated dashboard for one month (admin only).
///
/// The per-NGO list is returned whole; pagination is a client concern.
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    tag = "Reports",
    params(
        ("month" = String, Query, description = "Canonical month name"),
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to current"),
    ),
    responses(
        (status = 200, description = "Monthly summary", body = DashboardSummary),
        (status = 400, description = "Invalid query", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dashboard(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<DashboardQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let month = Month::parse(query.month.trim())
        .ok_or_else(|| AppError::InvalidInput("Invalid month".to_string()))?;

    let year = query.year.unwrap_or_else(current_year);
    if !(2020..=2030).contains(&year) {
        return Err(AppError::InvalidInput(
            "Year must be between 2020 and 2030".to_string(),
        ));
    }

    let summary = pool.monthly_summary(month, year).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Configure report routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/reports")
            .route(web::get().to(list_reports))
            .route(web::post().to(submit_report)),
    )
    .service(web::resource("/reports/dashboard").route(web::get().to(dashboard)));
}
