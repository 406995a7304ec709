//! Arcanum Arena — PostgreSQL document store.
//!
//! One JSONB table per document kind, versioned for optimistic
//! concurrency: every update is `WHERE id = $1 AND version = $2`, checked
//! via `rows_affected`.

pub mod pg;
pub mod schema;
