//! Report entity for SeaORM.
//!
//! One NGO's monthly activity record. The natural key (ngo_id, month, year)
//! is enforced by a unique index; writes for an existing key overwrite
//! attribute values while keeping the original id and created_at.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ngo_id: String,
    /// Display name derived from ngo_id, not independently settable.
    pub ngo_name: String,
    /// Canonical English month name.
    pub month: String,
    pub year: i32,
    pub people_helped: i32,
    pub events_conducted: i32,
    #[sea_orm(column_type = "Double")]
    pub funds_utilized: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
