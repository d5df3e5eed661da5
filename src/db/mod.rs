//! Database module providing connection management and queries.

pub mod contacts;
pub mod jobs;
pub mod reports;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Database connection pool wrapper around SeaORM's `DatabaseConnection`.
///
/// Injected explicitly into handlers and services; there is no ambient
/// process-wide handle.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured URL.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(10)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection (used by binaries and tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    /// Get access to the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
