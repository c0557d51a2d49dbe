//! Core storage engine traits.

use std::ops::Bound;

use super::StorageError;

/// A key-value pair returned by range scans.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// A storage engine that provides keyed-table operations.
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start a transaction.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Begin a read-write transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start a transaction.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;
}

/// A transaction over named tables of byte keys and values.
///
/// Tables come into existence on first write and are addressed by name;
/// names must not contain a NUL byte. Writes are only visible to readers
/// after [`Transaction::commit`]; dropping an uncommitted transaction
/// discards them.
///
/// # Savepoints
///
/// Savepoints nest like a stack: `begin_savepoint` marks the current
/// uncommitted state under a name, `release_savepoint` discards the mark
/// (and any marks nested inside it) keeping all writes, and
/// `rollback_savepoint` restores the marked state, undoing every write
/// made since. Rolling back a savepoint never aborts the transaction.
pub trait Transaction {
    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;

    /// Get a value by key from a table.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure; a missing table or key is
    /// `Ok(None)`.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a key-value pair into a table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key from a table.
    ///
    /// Returns `true` if the key existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError>;

    /// Collect the key-value pairs of a table within the given key bounds,
    /// in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure; a missing table is an empty
    /// result.
    fn scan_range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Vec<KeyValue>, StorageError>;

    /// Collect every key-value pair of a table in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn scan_table(&self, table: &str) -> Result<Vec<KeyValue>, StorageError> {
        self.scan_range(table, Bound::Unbounded, Bound::Unbounded)
    }

    /// Delete every key of a table.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn clear_table(&mut self, table: &str) -> Result<(), StorageError>;

    /// Mark the current state under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] on a read-only transaction.
    fn begin_savepoint(&mut self, name: &str) -> Result<(), StorageError>;

    /// Discard the mark named `name`, keeping all writes made since.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchSavepoint`] for an unknown name.
    fn release_savepoint(&mut self, name: &str) -> Result<(), StorageError>;

    /// Restore the state marked under `name`, undoing every write made
    /// since, and discard the mark.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoSuchSavepoint`] for an unknown name.
    fn rollback_savepoint(&mut self, name: &str) -> Result<(), StorageError>;

    /// Commit the transaction, making its writes durable and visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the writes.
    fn commit(self) -> Result<(), StorageError>;

    /// Roll back the transaction, discarding all writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to tear the transaction down.
    fn rollback(self) -> Result<(), StorageError>;
}
