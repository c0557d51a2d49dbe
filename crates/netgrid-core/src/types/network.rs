//! Network metadata types.
//!
//! A network is a named graph container. Its declared attributes live in a
//! single registry row ([`NetworkInfo`]): the immutable configuration
//! ([`NetworkConfig`]) plus the two monotone id counters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a network carries geometry.
///
/// A *logical* network is purely topological: neither nodes nor links have
/// geometry. A *spatial* network requires a point on every node and a
/// polyline on every link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkKind {
    /// Purely topological; geometry is forbidden.
    Logical,
    /// Geometry-bearing; geometry is required.
    Spatial,
}

impl NetworkKind {
    /// Check whether this is the spatial kind.
    #[inline]
    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(self, Self::Spatial)
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical => write!(f, "logical"),
            Self::Spatial => write!(f, "spatial"),
        }
    }
}

/// Declared attributes of a network, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Canonical (lowercase) network name.
    pub name: String,
    /// Logical or spatial.
    pub kind: NetworkKind,
    /// Declared coordinate reference id. `-1` means "undeclared".
    pub srid: i32,
    /// Whether geometries carry a third dimension.
    pub has_z: bool,
    /// Whether distinct nodes may share a location.
    pub allow_coincident: bool,
}

impl NetworkConfig {
    /// Create a configuration. The name is stored as given; callers are
    /// expected to canonicalize it first.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: NetworkKind,
        srid: i32,
        has_z: bool,
        allow_coincident: bool,
    ) -> Self {
        Self { name: name.into(), kind, srid, has_z, allow_coincident }
    }
}

/// The registry row for a network: configuration plus id counters.
///
/// The counters never decrease and always exceed the maximum id present in
/// the corresponding element table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// The declared configuration.
    pub config: NetworkConfig,
    /// Next node id to assign. Starts at 1; 0 is reserved.
    pub next_node_id: u64,
    /// Next link id to assign. Starts at 1; 0 is reserved.
    pub next_link_id: u64,
}

impl NetworkInfo {
    /// Create the registry row for a freshly created network.
    #[must_use]
    pub const fn new(config: NetworkConfig) -> Self {
        Self { config, next_node_id: 1, next_link_id: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(NetworkKind::Logical.to_string(), "logical");
        assert_eq!(NetworkKind::Spatial.to_string(), "spatial");
    }

    #[test]
    fn fresh_info_counters_start_at_one() {
        let info = NetworkInfo::new(NetworkConfig::new(
            "net",
            NetworkKind::Logical,
            -1,
            false,
            false,
        ));
        assert_eq!(info.next_node_id, 1);
        assert_eq!(info.next_link_id, 1);
    }
}
