//! The network engine: graph mutation algorithms over a
//! [`NetworkBackend`].
//!
//! Everything here enforces *graph* invariants: node isolation, endpoint
//! matching, coincidence policy. Argument shape, SRID/dimensionality, and
//! network-kind contracts are the mutation protocol's job and have already
//! been checked by the time an engine function runs. Invariant violations
//! surface as [`TopoError::Engine`] with the text the protocol records on
//! the accessor.
//!
//! Splitting and healing live in their own submodules; isolated-node and
//! link operations plus the nearest-element queries are defined here.

mod heal;
mod split;

pub use heal::{mod_link_heal, new_link_heal};
pub use split::{mod_geo_link_split, mod_log_link_split, new_geo_link_split, new_log_link_split};

use netgrid_core::geom::measure;
use netgrid_core::{Line, LinkId, NetLink, NetNode, NodeId, Point};

use crate::backend::{NetworkBackend, NetworkQuery};
use crate::error::{TopoError, TopoResult};

pub(crate) fn require_node<B: NetworkQuery>(b: &B, id: NodeId, role: &str) -> TopoResult<NetNode> {
    b.node_by_id(id)?.ok_or_else(|| TopoError::engine(format!("{role} {id} not found")))
}

pub(crate) fn require_link<B: NetworkQuery>(b: &B, id: LinkId) -> TopoResult<NetLink> {
    b.link_by_id(id)?.ok_or_else(|| TopoError::engine(format!("link {id} not found")))
}

fn ensure_isolated<B: NetworkQuery>(b: &B, id: NodeId) -> TopoResult<()> {
    if b.links_by_node(id)?.is_empty() {
        Ok(())
    } else {
        Err(TopoError::engine(format!("node {id} is not isolated")))
    }
}

pub(crate) fn ensure_not_coincident<B: NetworkQuery>(
    b: &B,
    pt: &Point,
    exclude: Option<NodeId>,
) -> TopoResult<()> {
    if b.config().allow_coincident {
        return Ok(());
    }
    for node in b.nodes_within_distance(pt, 0.0)? {
        if exclude != Some(node.id) {
            return Err(TopoError::engine(format!(
                "coincident node {} already exists",
                node.id
            )));
        }
    }
    Ok(())
}

fn check_endpoint(vertex: &Point, node: &NetNode, which: &str) -> TopoResult<()> {
    match &node.geom {
        Some(p) if vertex.coincides(p) => Ok(()),
        Some(_) => Err(TopoError::engine(format!(
            "link geometry {which} point does not match the {which} node"
        ))),
        None => Err(TopoError::engine(format!("{which} node {} has no geometry", node.id))),
    }
}

/// Add an isolated node.
///
/// # Errors
///
/// Rejects a location already occupied by a node unless the network allows
/// coincident nodes.
pub fn add_iso_net_node<B: NetworkBackend>(
    b: &mut B,
    geom: Option<&Point>,
) -> TopoResult<NodeId> {
    if let Some(pt) = geom {
        ensure_not_coincident(b, pt, None)?;
    }
    b.insert_node(geom.cloned())
}

/// Relocate an isolated node.
///
/// # Errors
///
/// Rejects a missing or non-isolated node, and an occupied target location
/// unless the network allows coincident nodes.
pub fn move_iso_net_node<B: NetworkBackend>(
    b: &mut B,
    id: NodeId,
    geom: Option<&Point>,
) -> TopoResult<()> {
    let node = require_node(b, id, "node")?;
    ensure_isolated(b, id)?;
    if let Some(pt) = geom {
        ensure_not_coincident(b, pt, Some(node.id))?;
    }
    b.update_node_geom(id, geom.cloned())
}

/// Remove an isolated node.
///
/// # Errors
///
/// Rejects a missing or non-isolated node.
pub fn rem_iso_net_node<B: NetworkBackend>(b: &mut B, id: NodeId) -> TopoResult<()> {
    require_node(b, id, "node")?;
    ensure_isolated(b, id)?;
    b.delete_node(id)?;
    Ok(())
}

/// Add a link between two existing nodes.
///
/// # Errors
///
/// Rejects missing endpoint nodes; on a spatial network, rejects a
/// geometry whose first/last vertex does not coincide with the start/end
/// node's point.
pub fn add_link<B: NetworkBackend>(
    b: &mut B,
    start: NodeId,
    end: NodeId,
    geom: Option<&Line>,
) -> TopoResult<LinkId> {
    let start_node = require_node(b, start, "start node")?;
    let end_node = require_node(b, end, "end node")?;
    if let Some(line) = geom {
        check_endpoint(line.first(), &start_node, "start")?;
        check_endpoint(line.last(), &end_node, "end")?;
    }
    let id = b.next_link_id()?;
    b.insert_link(&NetLink::new(id, start, end, geom.cloned()))?;
    Ok(id)
}

/// Replace a link's geometry.
///
/// # Errors
///
/// Rejects a missing link, and a geometry whose endpoint vertices do not
/// coincide with the link's current nodes.
pub fn change_link_geom<B: NetworkBackend>(
    b: &mut B,
    id: LinkId,
    geom: Option<&Line>,
) -> TopoResult<()> {
    let link = require_link(b, id)?;
    if let Some(line) = geom {
        let start_node = require_node(b, link.start, "start node")?;
        let end_node = require_node(b, link.end, "end node")?;
        check_endpoint(line.first(), &start_node, "start")?;
        check_endpoint(line.last(), &end_node, "end")?;
    }
    let new = NetLink::new(link.id, link.start, link.end, geom.cloned());
    b.update_link(&link, &new)
}

/// Remove a link.
///
/// # Errors
///
/// Rejects a missing link.
pub fn remove_link<B: NetworkBackend>(b: &mut B, id: LinkId) -> TopoResult<()> {
    require_link(b, id)?;
    b.delete_link(id)?;
    Ok(())
}

/// The nearest node within `tolerance` of `pt`, or `None`.
///
/// Equal distances resolve to the lowest id.
///
/// # Errors
///
/// Returns an error on storage failure.
pub fn find_node_by_point<B: NetworkQuery>(
    b: &B,
    pt: &Point,
    tolerance: f64,
) -> TopoResult<Option<NodeId>> {
    let mut best: Option<(f64, NodeId)> = None;
    for node in b.nodes_within_distance(pt, tolerance)? {
        let Some(g) = &node.geom else {
            continue;
        };
        let d = measure::distance_2d(g, pt);
        let better = match best {
            None => true,
            Some((bd, bid)) => d < bd || (d == bd && node.id < bid),
        };
        if better {
            best = Some((d, node.id));
        }
    }
    Ok(best.map(|(_, id)| id))
}

/// The nearest link within `tolerance` of `pt`, or `None`.
///
/// Equal distances resolve to the lowest id.
///
/// # Errors
///
/// Returns an error on storage failure.
pub fn find_link_by_point<B: NetworkQuery>(
    b: &B,
    pt: &Point,
    tolerance: f64,
) -> TopoResult<Option<LinkId>> {
    let mut best: Option<(f64, LinkId)> = None;
    for link in b.links_within_distance(pt, tolerance)? {
        let Some(line) = &link.geom else {
            continue;
        };
        let d = measure::point_line_distance_2d(pt, line);
        let better = match best {
            None => true,
            Some((bd, bid)) => d < bd || (d == bd && link.id < bid),
        };
        if better {
            best = Some((d, link.id));
        }
    }
    Ok(best.map(|(_, id)| id))
}
