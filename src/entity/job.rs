//! Job entity for SeaORM.
//!
//! Tracks one asynchronous CSV ingestion run. Status moves
//! pending -> processing -> {completed, completed_with_errors, failed}
//! and never leaves a terminal state.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub status: String,
    /// Integer percent, 0-100, non-decreasing while processing.
    pub progress: i32,
    /// Fixed once the CSV stream reaches EOF.
    pub total_rows: i32,
    pub processed_rows: i32,
    /// Free text on failure, or a serialized validation report on
    /// completed_with_errors.
    pub error_message: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
