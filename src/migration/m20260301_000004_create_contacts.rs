//! Migration: Create contacts table.

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
                CREATE TABLE contacts (
                    id UUID PRIMARY KEY,
                    name VARCHAR(100) NOT NULL,
                    email VARCHAR(200) NOT NULL,
                    ngo_id VARCHAR(50),
                    subject VARCHAR(200) NOT NULL,
                    message TEXT NOT NULL,
                    status VARCHAR(20) NOT NULL DEFAULT 'new'
                        CHECK (status IN ('new', 'in_progress', 'resolved')),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for admin filtering by status
                CREATE INDEX idx_contacts_status ON contacts(status);

                -- Index for listing by creation date
                CREATE INDEX idx_contacts_created_at ON contacts(created_at DESC);

                -- Trigger to update updated_at
                CREATE TRIGGER update_contacts_updated_at
                    BEFORE UPDATE ON contacts
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
                DROP TRIGGER IF EXISTS update_contacts_updated_at ON contacts;
                DROP TABLE IF EXISTS contacts CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
