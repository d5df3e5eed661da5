//! Integration tests for the CSV ingestion pipeline.
//!
//! The pipeline runs against an in-memory `IngestStore` so the full
//! parse -> validate -> upsert -> finalize flow is exercised without a
//! database.

mod pipeline_tests;
mod runner_tests;
mod support;
