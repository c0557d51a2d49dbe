//! Netgrid
//!
//! An embedded spatial-network topology engine: named, persistent graphs
//! of nodes and links over a keyed-table storage backend, with schema
//! management, a savepoint-wrapped mutation protocol, and validity
//! checking.
//!
//! A network is either *logical* (purely topological, no geometry) or
//! *spatial* (a point on every node, a polyline on every link, endpoint
//! vertices coinciding with the endpoint nodes). Every mutation runs
//! inside a named savepoint: a rejected edit rolls back completely and
//! its error text is recorded on the network's session handle.
//!
//! # Example
//!
//! ```
//! use netgrid::{Geometry, NetworkKind, Session};
//!
//! # fn main() -> netgrid::Result<()> {
//! let mut session = Session::in_memory()?;
//! session.create_network("roads", NetworkKind::Spatial, 4326, false, false)?;
//!
//! let a = session.add_iso_net_node("roads", Some(&Geometry::point(4326, 0.0, 0.0)))?;
//! let b = session.add_iso_net_node("roads", Some(&Geometry::point(4326, 1.0, 1.0)))?;
//! let line = Geometry::line_from_coords(4326, &[(0.0, 0.0), (1.0, 1.0)])?;
//! let link = session.add_link("roads", a, b, Some(&line))?;
//!
//! let report = session.check_spatial_net("roads")?;
//! assert!(report.is_valid());
//!
//! let split_at = Geometry::point(4326, 0.5, 0.5);
//! let mid = session.new_geo_link_split("roads", link, &split_at)?;
//! assert!(mid > b);
//! # Ok(())
//! # }
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

mod session;

pub use session::Session;

pub use netgrid_core::{
    BBox, CoreError, Geometry, Line, LinkId, NetLink, NetNode, NetworkConfig, NetworkInfo,
    NetworkKind, NodeId, Point, Shape,
};
pub use netgrid_storage::backends::{RedbConfig, RedbEngine};
pub use netgrid_storage::{StorageEngine, StorageError, Transaction};
pub use netgrid_topo::{
    Discrepancy, DiscrepancyKind, NetworkManager, TopoError as Error, ValidityReport,
};

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
