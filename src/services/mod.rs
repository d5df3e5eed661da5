//! Business logic services.

pub mod auth_admin;
pub mod ingest;
pub mod sweeper;

pub use auth_admin::configure_routes as configure_auth_routes;
pub use ingest::{IngestRunner, IngestStore};
pub use sweeper::{SweeperConfig, start_sweeper_task};
