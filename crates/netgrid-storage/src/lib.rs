//! Netgrid Storage
//!
//! This crate provides the storage engine abstraction consumed by the
//! topology layer, plus the bundled redb backend.
//!
//! The interface is a narrow keyed-table model: named tables of byte keys
//! and byte values, range scans, and transactions with *named savepoints*.
//! Savepoints are the contract the mutation protocol builds on: a graph
//! edit runs between `begin_savepoint` and `release_savepoint`, and a
//! failure rolls the transaction back to the savepoint without aborting
//! the enclosing transaction.
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and error type
//! - [`backends`] - Concrete backend implementations

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{KeyValue, StorageEngine, StorageError, Transaction};
