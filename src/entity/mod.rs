//! SeaORM entity definitions for PostgreSQL database.

pub mod contact;
pub mod job;
pub mod report;
pub mod user;
