//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NGO Portal Server",
        version = "0.3.0",
        description = "API server for NGO monthly activity reports with CSV bulk ingestion and polling-based job tracking"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Report endpoints
        api::reports::submit_report,
        api::reports::list_reports,
        api::reports::dashboard,
        // Upload / job endpoints
        api::uploads::upload_csv,
        api::uploads::job_status,
        api::uploads::list_jobs,
        // Contact endpoints
        api::contacts::submit_contact,
        api::contacts::list_contacts,
        api::contacts::list_contacts_by_status,
        api::contacts::get_contact,
        api::contacts::update_contact_status,
        // Auth endpoints
        services::auth_admin::login,
        services::auth_admin::logout,
        services::auth_admin::me,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Reports
            models::Month,
            models::SubmitReportRequest,
            models::ReportResponse,
            models::ListReportsQuery,
            models::DashboardQuery,
            models::DashboardSummary,
            models::NgoReportSummary,
            // Jobs
            models::JobStatus,
            models::UploadAcceptedResponse,
            models::JobStatusResponse,
            models::ValidationOutcome,
            models::RowError,
            // Contacts
            models::ContactStatus,
            models::SubmitContactRequest,
            models::UpdateContactStatusRequest,
            models::ContactResponse,
            // Auth
            models::LoginRequest,
            models::LoginResponse,
            models::UserInfo,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Reports", description = "Report submission and dashboards"),
        (name = "Uploads", description = "CSV bulk upload and job polling"),
        (name = "Contacts", description = "Contact form management"),
        (name = "Auth", description = "Admin authentication")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer-token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
