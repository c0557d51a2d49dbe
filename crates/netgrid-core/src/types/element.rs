//! The persisted graph primitives: nodes and links.

use serde::{Deserialize, Serialize};

use crate::geom::{Line, Point};

use super::{LinkId, NodeId};

/// A node of a network.
///
/// Nodes are created isolated (no incident links). The geometry is present
/// iff the owning network is spatial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetNode {
    /// Network-unique id, never reused.
    pub id: NodeId,
    /// Point location; `None` on logical networks.
    pub geom: Option<Point>,
}

impl NetNode {
    /// Create a node.
    #[must_use]
    pub const fn new(id: NodeId, geom: Option<Point>) -> Self {
        Self { id, geom }
    }
}

/// A link of a network, connecting two nodes.
///
/// The geometry is present iff the owning network is spatial; when present,
/// its first and last vertices coincide with the start and end nodes'
/// points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetLink {
    /// Network-unique id, never reused.
    pub id: LinkId,
    /// Start node.
    pub start: NodeId,
    /// End node.
    pub end: NodeId,
    /// Polyline geometry; `None` on logical networks.
    pub geom: Option<Line>,
}

impl NetLink {
    /// Create a link.
    #[must_use]
    pub const fn new(id: LinkId, start: NodeId, end: NodeId, geom: Option<Line>) -> Self {
        Self { id, start, end, geom }
    }

    /// Check whether `node` is one of this link's endpoints.
    #[inline]
    #[must_use]
    pub fn is_incident(&self, node: NodeId) -> bool {
        self.start == node || self.end == node
    }

    /// Check whether the link starts and ends at the same node.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }

    /// The endpoint other than `node`, or `node` itself for a closed link.
    #[must_use]
    pub fn opposite(&self, node: NodeId) -> NodeId {
        if self.start == node {
            self.end
        } else {
            self.start
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incidence_and_opposite() {
        let link = NetLink::new(LinkId::new(1), NodeId::new(10), NodeId::new(20), None);
        assert!(link.is_incident(NodeId::new(10)));
        assert!(link.is_incident(NodeId::new(20)));
        assert!(!link.is_incident(NodeId::new(30)));
        assert_eq!(link.opposite(NodeId::new(10)), NodeId::new(20));
        assert_eq!(link.opposite(NodeId::new(20)), NodeId::new(10));
        assert!(!link.is_closed());
    }

    #[test]
    fn closed_link() {
        let link = NetLink::new(LinkId::new(1), NodeId::new(5), NodeId::new(5), None);
        assert!(link.is_closed());
        assert_eq!(link.opposite(NodeId::new(5)), NodeId::new(5));
    }
}
