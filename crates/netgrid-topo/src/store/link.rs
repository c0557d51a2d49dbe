//! Link row storage.

use std::collections::BTreeSet;
use std::ops::Bound;

use netgrid_core::encoding::{keys, Decoder, Encoder};
use netgrid_core::geom::measure;
use netgrid_core::{BBox, LinkId, NetLink, NodeId, Point};
use netgrid_storage::Transaction;

use crate::error::{TopoError, TopoResult};
use crate::schema::NetTables;

use super::RegistryStore;

/// Link row operations.
///
/// Links are indexed three ways: by start node and by end node (adjacency
/// indexes, used for isolation checks and incident-link queries) and by
/// bounding box (geometry index). Every write keeps all three in step
/// with the row.
pub struct NetLinkStore;

impl NetLinkStore {
    /// Get a link by id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn get<T: Transaction>(tx: &T, t: &NetTables, id: LinkId) -> TopoResult<Option<NetLink>> {
        match tx.get(&t.links, &keys::id_key(id.as_u64()))? {
            Some(bytes) => Ok(Some(NetLink::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert a link under its pre-allocated id.
    ///
    /// The registry counter is raised past the id, so inserts can never
    /// make the counter lag the table.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn insert<T: Transaction>(tx: &mut T, t: &NetTables, link: &NetLink) -> TopoResult<()> {
        let key = keys::id_key(link.id.as_u64());
        tx.put(&t.links, &key, &link.encode()?)?;
        tx.put(&t.link_by_start, &keys::pair_key(link.start.as_u64(), link.id.as_u64()), &[])?;
        tx.put(&t.link_by_end, &keys::pair_key(link.end.as_u64(), link.id.as_u64()), &[])?;
        Self::sync_geom_index(tx, t, link)?;
        RegistryStore::observe_link_id(tx, &t.network, link.id)
    }

    /// Replace a link row, resynchronizing the indexes.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidArgument`] if the ids differ.
    pub fn update<T: Transaction>(
        tx: &mut T,
        t: &NetTables,
        old: &NetLink,
        new: &NetLink,
    ) -> TopoResult<()> {
        if old.id != new.id {
            return Err(TopoError::invalid_argument("link update must keep the id"));
        }
        tx.delete(&t.link_by_start, &keys::pair_key(old.start.as_u64(), old.id.as_u64()))?;
        tx.delete(&t.link_by_end, &keys::pair_key(old.end.as_u64(), old.id.as_u64()))?;

        let key = keys::id_key(new.id.as_u64());
        tx.put(&t.links, &key, &new.encode()?)?;
        tx.put(&t.link_by_start, &keys::pair_key(new.start.as_u64(), new.id.as_u64()), &[])?;
        tx.put(&t.link_by_end, &keys::pair_key(new.end.as_u64(), new.id.as_u64()), &[])?;
        Self::sync_geom_index(tx, t, new)
    }

    /// Delete a link. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn delete<T: Transaction>(tx: &mut T, t: &NetTables, id: LinkId) -> TopoResult<bool> {
        let Some(link) = Self::get(&*tx, t, id)? else {
            return Ok(false);
        };
        let key = keys::id_key(id.as_u64());
        tx.delete(&t.links, &key)?;
        tx.delete(&t.link_by_start, &keys::pair_key(link.start.as_u64(), id.as_u64()))?;
        tx.delete(&t.link_by_end, &keys::pair_key(link.end.as_u64(), id.as_u64()))?;
        tx.delete(&t.link_geom_idx, &key)?;
        Ok(true)
    }

    /// Collect the links incident to a node, in id order.
    ///
    /// A closed link (start = end) appears once.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn by_node<T: Transaction>(
        tx: &T,
        t: &NetTables,
        node: NodeId,
    ) -> TopoResult<Vec<NetLink>> {
        let mut ids = BTreeSet::new();
        let (start, end) = keys::pair_prefix_range(node.as_u64());
        for table in [&t.link_by_start, &t.link_by_end] {
            let end_bound = match &end {
                Some(e) => Bound::Excluded(e.as_slice()),
                None => Bound::Unbounded,
            };
            for (key, _) in tx.scan_range(table, Bound::Included(start.as_slice()), end_bound)? {
                if let Some((_, link_id)) = keys::decode_pair_key(&key) {
                    ids.insert(link_id);
                }
            }
        }

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(link) = Self::get(tx, t, LinkId::new(id))? {
                out.push(link);
            }
        }
        Ok(out)
    }

    /// Collect every link, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn all<T: Transaction>(tx: &T, t: &NetTables) -> TopoResult<Vec<NetLink>> {
        let mut out = Vec::new();
        for (_, bytes) in tx.scan_table(&t.links)? {
            out.push(NetLink::decode(&bytes)?);
        }
        Ok(out)
    }

    /// Collect the links whose geometry lies within `dist` of `pt`.
    ///
    /// The geometry index prefilters candidates by bounding box; the exact
    /// planar distance decides.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn within_distance<T: Transaction>(
        tx: &T,
        t: &NetTables,
        pt: &Point,
        dist: f64,
    ) -> TopoResult<Vec<NetLink>> {
        let probe = BBox::from_point(pt).expand(dist);
        let mut out = Vec::new();
        for (key, bytes) in tx.scan_table(&t.link_geom_idx)? {
            let bbox = BBox::decode(&bytes)?;
            if !probe.intersects(&bbox) {
                continue;
            }
            let Some(raw) = keys::decode_id_key(&key) else {
                continue;
            };
            if let Some(link) = Self::get(tx, t, LinkId::new(raw))? {
                if let Some(line) = &link.geom {
                    if measure::point_line_distance_2d(pt, line) <= dist {
                        out.push(link);
                    }
                }
            }
        }
        Ok(out)
    }

    fn sync_geom_index<T: Transaction>(
        tx: &mut T,
        t: &NetTables,
        link: &NetLink,
    ) -> TopoResult<()> {
        let key = keys::id_key(link.id.as_u64());
        match &link.geom {
            Some(line) => {
                tx.put(&t.link_geom_idx, &key, &BBox::from_line(line).encode()?)?;
            }
            None => {
                tx.delete(&t.link_geom_idx, &key)?;
            }
        }
        Ok(())
    }
}
