//! Node row storage.

use netgrid_core::encoding::{keys, Decoder, Encoder};
use netgrid_core::geom::measure;
use netgrid_core::{BBox, NetNode, NodeId, Point};
use netgrid_storage::Transaction;

use crate::error::{TopoError, TopoResult};
use crate::schema::NetTables;

use super::RegistryStore;

/// Node row operations.
///
/// Every write keeps the geometry index in step with the row: a node with
/// geometry has exactly one index entry holding its bounding box, a node
/// without geometry has none.
pub struct NetNodeStore;

impl NetNodeStore {
    /// Get a node by id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn get<T: Transaction>(tx: &T, t: &NetTables, id: NodeId) -> TopoResult<Option<NetNode>> {
        match tx.get(&t.nodes, &keys::id_key(id.as_u64()))? {
            Some(bytes) => Ok(Some(NetNode::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Check if a node exists.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn exists<T: Transaction>(tx: &T, t: &NetTables, id: NodeId) -> TopoResult<bool> {
        Ok(tx.get(&t.nodes, &keys::id_key(id.as_u64()))?.is_some())
    }

    /// Insert a node with a freshly allocated id and return it.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn insert<T: Transaction>(
        tx: &mut T,
        t: &NetTables,
        geom: Option<Point>,
    ) -> TopoResult<NodeId> {
        let id = RegistryStore::allocate_node_id(tx, &t.network)?;
        let node = NetNode::new(id, geom);
        tx.put(&t.nodes, &keys::id_key(id.as_u64()), &node.encode()?)?;
        Self::sync_geom_index(tx, t, &node)?;
        Ok(id)
    }

    /// Replace a node's geometry.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidArgument`] if the node does not exist.
    pub fn update_geom<T: Transaction>(
        tx: &mut T,
        t: &NetTables,
        id: NodeId,
        geom: Option<Point>,
    ) -> TopoResult<()> {
        if !Self::exists(&*tx, t, id)? {
            return Err(TopoError::invalid_argument(format!("node {id} does not exist")));
        }
        let node = NetNode::new(id, geom);
        tx.put(&t.nodes, &keys::id_key(id.as_u64()), &node.encode()?)?;
        Self::sync_geom_index(tx, t, &node)?;
        Ok(())
    }

    /// Delete a node. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn delete<T: Transaction>(tx: &mut T, t: &NetTables, id: NodeId) -> TopoResult<bool> {
        let key = keys::id_key(id.as_u64());
        let existed = tx.delete(&t.nodes, &key)?;
        tx.delete(&t.node_geom_idx, &key)?;
        Ok(existed)
    }

    /// Collect every node, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn all<T: Transaction>(tx: &T, t: &NetTables) -> TopoResult<Vec<NetNode>> {
        let mut out = Vec::new();
        for (_, bytes) in tx.scan_table(&t.nodes)? {
            out.push(NetNode::decode(&bytes)?);
        }
        Ok(out)
    }

    /// Collect the nodes whose geometry lies within `dist` of `pt`.
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
    ) -> TopoResult<Vec<NetNode>> {
        let probe = BBox::from_point(pt).expand(dist);
        let mut out = Vec::new();
        for (key, bytes) in tx.scan_table(&t.node_geom_idx)? {
            let bbox = BBox::decode(&bytes)?;
            if !probe.intersects(&bbox) {
                continue;
            }
            let Some(raw) = keys::decode_id_key(&key) else {
                continue;
            };
            if let Some(node) = Self::get(tx, t, NodeId::new(raw))? {
                if let Some(g) = &node.geom {
                    if measure::distance_2d(g, pt) <= dist {
                        out.push(node);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Collect the nodes whose geometry lies within `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn within_box<T: Transaction>(
        tx: &T,
        t: &NetTables,
        bbox: &BBox,
    ) -> TopoResult<Vec<NetNode>> {
        let mut out = Vec::new();
        for (key, bytes) in tx.scan_table(&t.node_geom_idx)? {
            let candidate = BBox::decode(&bytes)?;
            if !bbox.intersects(&candidate) {
                continue;
            }
            let Some(raw) = keys::decode_id_key(&key) else {
                continue;
            };
            if let Some(node) = Self::get(tx, t, NodeId::new(raw))? {
                if let Some(g) = &node.geom {
                    if bbox.contains_point(g) {
                        out.push(node);
                    }
                }
            }
        }
        Ok(out)
    }

    fn sync_geom_index<T: Transaction>(
        tx: &mut T,
        t: &NetTables,
        node: &NetNode,
    ) -> TopoResult<()> {
        let key = keys::id_key(node.id.as_u64());
        match &node.geom {
            Some(p) => {
                tx.put(&t.node_geom_idx, &key, &BBox::from_point(p).encode()?)?;
            }
            None => {
                tx.delete(&t.node_geom_idx, &key)?;
            }
        }
        Ok(())
    }
}
