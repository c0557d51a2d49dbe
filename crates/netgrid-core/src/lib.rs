//! Netgrid Core
//!
//! This crate provides the fundamental types shared by the Netgrid
//! workspace: element identifiers, geometry values, network metadata, and
//! the binary encoding used for persisted rows.
//!
//! # Overview
//!
//! - **Identifiers**: [`NodeId`] and [`LinkId`] for referencing network
//!   elements
//! - **Geometry**: [`Point`], [`Line`], and the [`Geometry`] sum type
//!   validated at construction
//! - **Network metadata**: [`NetworkKind`], [`NetworkConfig`], and the
//!   registry row [`NetworkInfo`]
//! - **Elements**: [`NetNode`] and [`NetLink`], the persisted graph
//!   primitives
//! - **Encoding**: [`encoding::Encoder`] / [`encoding::Decoder`] and the
//!   key layouts used by the storage layer
//!
//! # Example
//!
//! ```
//! use netgrid_core::{Geometry, NetworkConfig, NetworkKind};
//!
//! let config = NetworkConfig::new("roads", NetworkKind::Spatial, 4326, false, false);
//! assert!(config.kind.is_spatial());
//!
//! let geom = Geometry::point(4326, 11.2, 43.7);
//! assert!(geom.as_point().is_some());
//! assert!(!geom.has_z());
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod geom;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use geom::{BBox, Geometry, Line, Point, Shape};
pub use types::{LinkId, NetLink, NetNode, NetworkConfig, NetworkInfo, NetworkKind, NodeId};
