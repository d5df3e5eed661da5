//! Migration: Create reports table.
//!
//! Reports carry one NGO's monthly activity numbers. The natural key
//! (ngo_id, month, year) gets a unique index so upserts can target it
//! atomically with ON CONFLICT.

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
                CREATE TABLE reports (
                    id UUID PRIMARY KEY,
                    ngo_id VARCHAR(50) NOT NULL,
                    ngo_name VARCHAR(100) NOT NULL,
                    month VARCHAR(20) NOT NULL
                        CHECK (month IN ('January', 'February', 'March', 'April',
                                         'May', 'June', 'July', 'August',
                                         'September', 'October', 'November', 'December')),
                    year INTEGER NOT NULL,
                    people_helped INTEGER NOT NULL,
                    events_conducted INTEGER NOT NULL,
                    funds_utilized DOUBLE PRECISION NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Natural key: at most one report per NGO per month per year
                CREATE UNIQUE INDEX idx_reports_natural_key ON reports(ngo_id, month, year);

                -- Index for dashboard queries
                CREATE INDEX idx_reports_month_year ON reports(month, year);

                -- Index for per-NGO lookups
                CREATE INDEX idx_reports_ngo_id ON reports(ngo_id);

                -- Trigger to update updated_at
                CREATE TRIGGER update_reports_updated_at
                    BEFORE UPDATE ON reports
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
                DROP TRIGGER IF EXISTS update_reports_updated_at ON reports;
                DROP TABLE IF EXISTS reports CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
