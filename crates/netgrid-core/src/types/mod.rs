//! Core data types for Netgrid networks.
//!
//! # Modules
//!
//! - [`id`] - Identifier newtypes for nodes and links
//! - [`network`] - Network metadata (kind, configuration, registry row)
//! - [`element`] - The persisted graph primitives ([`NetNode`], [`NetLink`])

mod element;
mod id;
mod network;

pub use element::{NetLink, NetNode};
pub use id::{LinkId, NodeId};
pub use network::{NetworkConfig, NetworkInfo, NetworkKind};
