//! Link splitting.
//!
//! A split replaces one link with two, introducing a new node at the split
//! point. The "New" variants retire the original link and allocate fresh
//! ids for both halves; the "Mod" variants truncate the original link in
//! place and allocate one new id for the second half. Either way the
//! overall connectivity is preserved: a path that used the original link
//! now runs through the new node.

use netgrid_core::geom::measure;
use netgrid_core::{Line, LinkId, NetLink, NodeId, Point};

use crate::backend::NetworkBackend;
use crate::error::{TopoError, TopoResult};

use super::{ensure_not_coincident, require_link};

/// Split a logical link into two new links.
///
/// Returns the id of the node introduced at the split point.
///
/// # Errors
///
/// Rejects a missing link.
pub fn new_log_link_split<B: NetworkBackend>(b: &mut B, link_id: LinkId) -> TopoResult<NodeId> {
    let link = require_link(b, link_id)?;
    let node = b.insert_node(None)?;

    b.delete_link(link.id)?;
    let first = b.next_link_id()?;
    b.insert_link(&NetLink::new(first, link.start, node, None))?;
    let second = b.next_link_id()?;
    b.insert_link(&NetLink::new(second, node, link.end, None))?;
    Ok(node)
}

/// Split a logical link, truncating it in place.
///
/// The original link keeps its id and now ends at the new node; one new
/// link continues to the original end. Returns the new node's id.
///
/// # Errors
///
/// Rejects a missing link.
pub fn mod_log_link_split<B: NetworkBackend>(b: &mut B, link_id: LinkId) -> TopoResult<NodeId> {
    let link = require_link(b, link_id)?;
    let node = b.insert_node(None)?;

    let truncated = NetLink::new(link.id, link.start, node, None);
    b.update_link(&link, &truncated)?;
    let second = b.next_link_id()?;
    b.insert_link(&NetLink::new(second, node, link.end, None))?;
    Ok(node)
}

/// Split a spatial link at a point on its geometry, producing two new
/// links.
///
/// Returns the id of the node introduced at the split point.
///
/// # Errors
///
/// Rejects a missing link, a point off the link's geometry or on one of
/// its endpoints, and a split location already occupied by a node unless
/// the network allows coincident nodes.
pub fn new_geo_link_split<B: NetworkBackend>(
    b: &mut B,
    link_id: LinkId,
    pt: &Point,
) -> TopoResult<NodeId> {
    let link = require_link(b, link_id)?;
    let (first_geom, second_geom, cut) = cut_link_geometry(&link, pt)?;
    ensure_not_coincident(b, &cut, None)?;

    let node = b.insert_node(Some(cut))?;
    b.delete_link(link.id)?;
    let first = b.next_link_id()?;
    b.insert_link(&NetLink::new(first, link.start, node, Some(first_geom)))?;
    let second = b.next_link_id()?;
    b.insert_link(&NetLink::new(second, node, link.end, Some(second_geom)))?;
    Ok(node)
}

/// Split a spatial link at a point on its geometry, truncating it in
/// place.
///
/// The original link keeps its id and the first half of the geometry; one
/// new link carries the second half. Returns the new node's id.
///
/// # Errors
///
/// Rejects a missing link, a point off the link's geometry or on one of
/// its endpoints, and a split location already occupied by a node unless
/// the network allows coincident nodes.
pub fn mod_geo_link_split<B: NetworkBackend>(
    b: &mut B,
    link_id: LinkId,
    pt: &Point,
) -> TopoResult<NodeId> {
    let link = require_link(b, link_id)?;
    let (first_geom, second_geom, cut) = cut_link_geometry(&link, pt)?;
    ensure_not_coincident(b, &cut, None)?;

    let node = b.insert_node(Some(cut))?;
    let truncated = NetLink::new(link.id, link.start, node, Some(first_geom));
    b.update_link(&link, &truncated)?;
    let second = b.next_link_id()?;
    b.insert_link(&NetLink::new(second, node, link.end, Some(second_geom)))?;
    Ok(node)
}

/// Cut a link's geometry at `pt`, returning both halves and the snapped
/// cut point.
fn cut_link_geometry(link: &NetLink, pt: &Point) -> TopoResult<(Line, Line, Point)> {
    let line = link
        .geom
        .as_ref()
        .ok_or_else(|| TopoError::engine(format!("link {} has no geometry", link.id)))?;
    if pt.coincides(line.first()) || pt.coincides(line.last()) {
        return Err(TopoError::engine("split point coincides with a link endpoint"));
    }
    let (first, second) = measure::split_line(line, pt)
        .ok_or_else(|| TopoError::engine("split point is not on the link"))?;
    let cut = *first.last();
    Ok((first, second, cut))
}
