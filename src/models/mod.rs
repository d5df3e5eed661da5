//! Domain models for the NGO portal.

pub mod contact;
pub mod job;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use contact::{
    ContactResponse, ContactStatus, SubmitContactRequest, UpdateContactStatusRequest,
};
pub use job::{
    JobStatus, JobStatusResponse, JobUpdate, RowError, UploadAcceptedResponse, ValidationOutcome,
};
pub use report::{
    DashboardQuery, DashboardSummary, ListReportsQuery, Month, NgoReportSummary, ReportRecord,
    ReportResponse, SubmitReportRequest,
};
pub use user::{Claims, LoginRequest, LoginResponse, UserInfo};
