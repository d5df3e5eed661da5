//! Migration: Create jobs table.
//!
//! Jobs track asynchronous CSV bulk-ingestion runs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE jobs (
                    id UUID PRIMARY KEY,
                    status VARCHAR(30) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'processing', 'completed',
                                          'completed_with_errors', 'failed')),

                    -- Integer percent, 0-100
                    progress INTEGER NOT NULL DEFAULT 0
                        CHECK (progress >= 0 AND progress <= 100),
                    total_rows INTEGER NOT NULL DEFAULT 0,
                    processed_rows INTEGER NOT NULL DEFAULT 0,

                    -- Failure description, or a serialized validation report
                    -- when status is 'completed_with_errors'
                    error_message TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for status queries (stale-job sweep)
                CREATE INDEX idx_jobs_status ON jobs(status);

                -- Index for listing by creation date
                CREATE INDEX idx_jobs_created_at ON jobs(created_at DESC);

                -- Trigger to update updated_at
                CREATE TRIGGER update_jobs_updated_at
                    BEFORE UPDATE ON jobs
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_jobs_updated_at ON jobs;
                DROP TABLE IF EXISTS jobs CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
