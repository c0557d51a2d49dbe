//! Redb storage backend.
//!
//! All logical tables share one physical redb table; keys are prefixed
//! with the table name so each logical table occupies a contiguous key
//! range. Writes are buffered in an in-memory overlay until commit, which
//! is what makes named savepoints cheap: a savepoint snapshots only the
//! overlay, never the database.

mod engine;
mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::RedbTransaction;
