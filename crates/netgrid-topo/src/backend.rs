//! The backend callback surface between the network engine and persistent
//! state.
//!
//! The engine never touches tables directly: every read and write of
//! nodes, links, and counters goes through these traits. [`NetworkQuery`]
//! is the read half (configuration, lookups, spatial search);
//! [`NetworkBackend`] adds the write half. Both are implemented once by
//! [`StorageBridge`], which translates each call into element-store
//! operations on the live transaction; [`QueryBridge`] implements the
//! read half over a shared transaction reference so point queries can run
//! in read-only transactions.

use netgrid_core::{BBox, LinkId, NetLink, NetNode, NetworkConfig, NodeId, Point};
use netgrid_storage::Transaction;

use crate::error::TopoResult;
use crate::schema::NetTables;
use crate::store::{NetLinkStore, NetNodeStore, RegistryStore};

/// Read-only persistent-state access for the network engine.
pub trait NetworkQuery {
    /// The declared configuration of the network.
    fn config(&self) -> &NetworkConfig;

    /// Get a node by id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn node_by_id(&self, id: NodeId) -> TopoResult<Option<NetNode>>;

    /// The nodes within planar distance `dist` of `pt`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn nodes_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetNode>>;

    /// The nodes inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn nodes_within_box(&self, bbox: &BBox) -> TopoResult<Vec<NetNode>>;

    /// Get a link by id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn link_by_id(&self, id: LinkId) -> TopoResult<Option<NetLink>>;

    /// The links incident to a node.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn links_by_node(&self, id: NodeId) -> TopoResult<Vec<NetLink>>;

    /// The links within planar distance `dist` of `pt`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn links_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetLink>>;
}

/// Full persistent-state access for the network engine.
pub trait NetworkBackend: NetworkQuery {
    /// Insert a node, assigning the next node id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn insert_node(&mut self, geom: Option<Point>) -> TopoResult<NodeId>;

    /// Replace a node's geometry.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn update_node_geom(&mut self, id: NodeId, geom: Option<Point>) -> TopoResult<()>;

    /// Delete a node. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn delete_node(&mut self, id: NodeId) -> TopoResult<bool>;

    /// Allocate the next link id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn next_link_id(&mut self) -> TopoResult<LinkId>;

    /// Insert a link under a pre-allocated id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn insert_link(&mut self, link: &NetLink) -> TopoResult<()>;

    /// Replace a link row.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn update_link(&mut self, old: &NetLink, new: &NetLink) -> TopoResult<()>;

    /// Delete a link. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn delete_link(&mut self, id: LinkId) -> TopoResult<bool>;
}

/// The production implementation of the full backend: element-store calls
/// against a live write transaction, scoped to one network's tables.
pub struct StorageBridge<'a, T: Transaction> {
    tx: &'a mut T,
    config: &'a NetworkConfig,
    tables: &'a NetTables,
}

impl<'a, T: Transaction> StorageBridge<'a, T> {
    /// Bind a bridge to a transaction and a network.
    pub fn new(tx: &'a mut T, config: &'a NetworkConfig, tables: &'a NetTables) -> Self {
        Self { tx, config, tables }
    }
}

impl<T: Transaction> NetworkQuery for StorageBridge<'_, T> {
    fn config(&self) -> &NetworkConfig {
        self.config
    }

    fn node_by_id(&self, id: NodeId) -> TopoResult<Option<NetNode>> {
        NetNodeStore::get(&*self.tx, self.tables, id)
    }

    fn nodes_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetNode>> {
        NetNodeStore::within_distance(&*self.tx, self.tables, pt, dist)
    }

    fn nodes_within_box(&self, bbox: &BBox) -> TopoResult<Vec<NetNode>> {
        NetNodeStore::within_box(&*self.tx, self.tables, bbox)
    }

    fn link_by_id(&self, id: LinkId) -> TopoResult<Option<NetLink>> {
        NetLinkStore::get(&*self.tx, self.tables, id)
    }

    fn links_by_node(&self, id: NodeId) -> TopoResult<Vec<NetLink>> {
        NetLinkStore::by_node(&*self.tx, self.tables, id)
    }

    fn links_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetLink>> {
        NetLinkStore::within_distance(&*self.tx, self.tables, pt, dist)
    }
}

impl<T: Transaction> NetworkBackend for StorageBridge<'_, T> {
    fn insert_node(&mut self, geom: Option<Point>) -> TopoResult<NodeId> {
        NetNodeStore::insert(self.tx, self.tables, geom)
    }

    fn update_node_geom(&mut self, id: NodeId, geom: Option<Point>) -> TopoResult<()> {
        NetNodeStore::update_geom(self.tx, self.tables, id, geom)
    }

    fn delete_node(&mut self, id: NodeId) -> TopoResult<bool> {
        NetNodeStore::delete(self.tx, self.tables, id)
    }

    fn next_link_id(&mut self) -> TopoResult<LinkId> {
        RegistryStore::allocate_link_id(self.tx, &self.tables.network)
    }

    fn insert_link(&mut self, link: &NetLink) -> TopoResult<()> {
        NetLinkStore::insert(self.tx, self.tables, link)
    }

    fn update_link(&mut self, old: &NetLink, new: &NetLink) -> TopoResult<()> {
        NetLinkStore::update(self.tx, self.tables, old, new)
    }

    fn delete_link(&mut self, id: LinkId) -> TopoResult<bool> {
        NetLinkStore::delete(self.tx, self.tables, id)
    }
}

/// Read-only bridge for point queries; works with read transactions.
pub struct QueryBridge<'a, T: Transaction> {
    tx: &'a T,
    config: &'a NetworkConfig,
    tables: &'a NetTables,
}

impl<'a, T: Transaction> QueryBridge<'a, T> {
    /// Bind a read-only bridge to a transaction and a network.
    pub fn new(tx: &'a T, config: &'a NetworkConfig, tables: &'a NetTables) -> Self {
        Self { tx, config, tables }
    }
}

impl<T: Transaction> NetworkQuery for QueryBridge<'_, T> {
    fn config(&self) -> &NetworkConfig {
        self.config
    }

    fn node_by_id(&self, id: NodeId) -> TopoResult<Option<NetNode>> {
        NetNodeStore::get(self.tx, self.tables, id)
    }

    fn nodes_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetNode>> {
        NetNodeStore::within_distance(self.tx, self.tables, pt, dist)
    }

    fn nodes_within_box(&self, bbox: &BBox) -> TopoResult<Vec<NetNode>> {
        NetNodeStore::within_box(self.tx, self.tables, bbox)
    }

    fn link_by_id(&self, id: LinkId) -> TopoResult<Option<NetLink>> {
        NetLinkStore::get(self.tx, self.tables, id)
    }

    fn links_by_node(&self, id: NodeId) -> TopoResult<Vec<NetLink>> {
        NetLinkStore::by_node(self.tx, self.tables, id)
    }

    fn links_within_distance(&self, pt: &Point, dist: f64) -> TopoResult<Vec<NetLink>> {
        NetLinkStore::within_distance(self.tx, self.tables, pt, dist)
    }
}
