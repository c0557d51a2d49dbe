//! Netgrid Topology
//!
//! This crate is the core of Netgrid: persistent networks of nodes and
//! links over a storage engine, with schema management, a savepoint-
//! wrapped graph mutation protocol, and validity checking.
//!
//! # Architecture
//!
//! - [`schema`] - Network registry, object catalog, and geometry-column
//!   registrations; create/drop/validate networks
//! - [`store`] - Row-level element stores keeping adjacency and geometry
//!   indexes and the id counters synchronized
//! - [`backend`] - The callback seam the network engine is written
//!   against, implemented by the storage bridges
//! - [`engine`] - The graph mutation algorithms (isolated-node ops, link
//!   ops, splits, heals, point queries)
//! - [`accessor`] - Per-session network handles with the sticky
//!   last-error slot, owned by the session's cache
//! - [`ops`] - The caller-facing mutation protocol: validation, savepoint
//!   scoping, error capture
//! - [`validity`] - Discrepancy scans for logical and spatial networks
//!
//! # Example
//!
//! ```ignore
//! use netgrid_core::{Geometry, NetworkKind};
//! use netgrid_storage::backends::RedbEngine;
//! use netgrid_storage::{StorageEngine, Transaction};
//! use netgrid_topo::NetworkManager;
//!
//! let engine = RedbEngine::in_memory()?;
//! let mut manager = NetworkManager::new();
//!
//! let mut tx = engine.begin_write()?;
//! manager.create_network(&mut tx, "roads", NetworkKind::Spatial, 4326, false, false)?;
//! let a = manager.add_iso_net_node(&mut tx, "roads", Some(&Geometry::point(4326, 0.0, 0.0)))?;
//! let b = manager.add_iso_net_node(&mut tx, "roads", Some(&Geometry::point(4326, 1.0, 1.0)))?;
//! let line = Geometry::line_from_coords(4326, &[(0.0, 0.0), (1.0, 1.0)])?;
//! manager.add_link(&mut tx, "roads", a, b, Some(&line))?;
//! tx.commit()?;
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod accessor;
pub mod backend;
pub mod engine;
pub mod error;
pub mod ops;
pub mod schema;
pub mod store;
pub mod validity;

// Re-export commonly used types
pub use accessor::{AccessorCache, NetworkAccessor};
pub use backend::{NetworkBackend, NetworkQuery, QueryBridge, StorageBridge};
pub use error::{TopoError, TopoResult};
pub use ops::NetworkManager;
pub use schema::NetTables;
pub use validity::{Discrepancy, DiscrepancyKind, ValidityReport};
