//! Storage error types.

use thiserror::Error;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A write was attempted on a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// A transaction error occurred.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A savepoint name was released or rolled back without being begun.
    #[error("no such savepoint: {0}")]
    NoSuchSavepoint(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backend-internal error occurred.
    #[error("internal storage error: {0}")]
    Internal(String),
}
