//! Link healing, the inverse of splitting.
//!
//! Healing merges two links that meet at a shared node of degree two into
//! a single link and removes the node. The "New" variant retires both
//! links and allocates a fresh id for the merged one; the "Mod" variant
//! rewrites the first link in place and deletes the second. Both return
//! the id of the removed node.

use netgrid_core::geom::measure;
use netgrid_core::{Line, LinkId, NetLink, NodeId};

use crate::backend::NetworkBackend;
use crate::error::{TopoError, TopoResult};

use super::require_link;

/// The validated inputs of a heal: both links and the shared node.
struct HealPlan {
    first: NetLink,
    second: NetLink,
    shared: NodeId,
}

fn plan_heal<B: NetworkBackend>(b: &B, id1: LinkId, id2: LinkId) -> TopoResult<HealPlan> {
    if id1 == id2 {
        return Err(TopoError::engine("cannot heal a link with itself"));
    }
    let first = require_link(b, id1)?;
    let second = require_link(b, id2)?;
    if first.is_closed() || second.is_closed() {
        return Err(TopoError::engine("cannot heal a closed link"));
    }

    let shared_start = second.is_incident(first.start);
    let shared_end = second.is_incident(first.end);
    let shared = match (shared_start, shared_end) {
        (true, true) => {
            return Err(TopoError::engine("links share both endpoint nodes"));
        }
        (true, false) => first.start,
        (false, true) => first.end,
        (false, false) => {
            return Err(TopoError::engine("links do not share an endpoint node"));
        }
    };

    // The shared node must connect exactly these two links, or removing it
    // would orphan the others.
    if b.links_by_node(shared)?.iter().any(|l| l.id != id1 && l.id != id2) {
        return Err(TopoError::engine(format!(
            "node {shared} is referenced by other links"
        )));
    }

    Ok(HealPlan { first, second, shared })
}

/// The merged endpoints and geometry: the first link oriented into the
/// shared node, the second oriented out of it.
fn merge_links(plan: &HealPlan) -> TopoResult<(NodeId, NodeId, Option<Line>)> {
    let HealPlan { first, second, shared } = plan;

    let new_start = first.opposite(*shared);
    let new_end = second.opposite(*shared);

    let geom = match (&first.geom, &second.geom) {
        (Some(g1), Some(g2)) => {
            let head = if first.end == *shared { g1.clone() } else { g1.reversed() };
            let tail = if second.start == *shared { g2.clone() } else { g2.reversed() };
            Some(measure::join_lines(&head, &tail).map_err(|e| TopoError::engine(e.to_string()))?)
        }
        (None, None) => None,
        _ => {
            return Err(TopoError::engine("inconsistent link geometries"));
        }
    };

    Ok((new_start, new_end, geom))
}

/// Heal two links into one new link, removing the shared node.
///
/// Returns the removed node's id.
///
/// # Errors
///
/// Rejects missing or closed links, links that do not share exactly one
/// endpoint node, and a shared node referenced by any other link.
pub fn new_link_heal<B: NetworkBackend>(
    b: &mut B,
    id1: LinkId,
    id2: LinkId,
) -> TopoResult<NodeId> {
    let plan = plan_heal(b, id1, id2)?;
    let (start, end, geom) = merge_links(&plan)?;

    b.delete_link(plan.first.id)?;
    b.delete_link(plan.second.id)?;
    let merged = b.next_link_id()?;
    b.insert_link(&NetLink::new(merged, start, end, geom))?;
    b.delete_node(plan.shared)?;
    Ok(plan.shared)
}

/// Heal two links by extending the first in place, removing the shared
/// node.
///
/// The first link keeps its id and absorbs the second link's extent.
/// Returns the removed node's id.
///
/// # Errors
///
/// Rejects missing or closed links, links that do not share exactly one
/// endpoint node, and a shared node referenced by any other link.
pub fn mod_link_heal<B: NetworkBackend>(
    b: &mut B,
    id1: LinkId,
    id2: LinkId,
) -> TopoResult<NodeId> {
    let plan = plan_heal(b, id1, id2)?;
    let (start, end, geom) = merge_links(&plan)?;

    let extended = NetLink::new(plan.first.id, start, end, geom);
    b.update_link(&plan.first, &extended)?;
    b.delete_link(plan.second.id)?;
    b.delete_node(plan.shared)?;
    Ok(plan.shared)
}
