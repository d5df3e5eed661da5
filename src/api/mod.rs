//! API endpoint modules.

pub mod contacts;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod uploads;

pub use contacts::configure_routes as configure_contact_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use reports::configure_routes as configure_report_routes;
pub use uploads::configure_routes as configure_upload_routes;
