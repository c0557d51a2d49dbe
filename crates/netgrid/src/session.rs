//! The session: one storage engine, one accessor cache, one operation at a
//! time.

use std::path::Path;

use netgrid_core::{Geometry, LinkId, NetworkInfo, NetworkKind, NodeId};
use netgrid_storage::backends::RedbEngine;
use netgrid_storage::{StorageEngine, Transaction};
use netgrid_topo::store::RegistryStore;
use netgrid_topo::{NetworkManager, ValidityReport};

use crate::Result;

/// A session bound to one storage engine.
///
/// The session owns the engine and the per-session state the mutation
/// protocol needs: the accessor cache (one live handle per network) and
/// the savepoint name sequence. Each operation runs in its own
/// transaction, committed on success and discarded on failure; the
/// savepoint wrapping inside guarantees a failed operation leaves no
/// trace even mid-transaction.
///
/// Sessions follow the single-threaded cooperative model: one outstanding
/// operation at a time. Separate sessions over separate engine handles
/// are fully independent.
///
/// # Example
///
/// ```
/// use netgrid::{NetworkKind, Session};
///
/// # fn main() -> netgrid::Result<()> {
/// let mut session = Session::in_memory()?;
/// session.create_network("net1", NetworkKind::Logical, -1, false, false)?;
/// let a = session.add_iso_net_node("net1", None)?;
/// let b = session.add_iso_net_node("net1", None)?;
/// session.add_link("net1", a, b, None)?;
/// # Ok(())
/// # }
/// ```
pub struct Session<E: StorageEngine> {
    engine: E,
    manager: NetworkManager,
}

impl Session<RedbEngine> {
    /// Open or create a session over a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(RedbEngine::open(path)?))
    }

    /// Create a session over an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(RedbEngine::in_memory()?))
    }
}

impl<E: StorageEngine> Session<E> {
    /// Create a session over an existing engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self { engine, manager: NetworkManager::new() }
    }

    /// The underlying storage engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Create a network.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NameConflict`] if the name or any derived
    /// schema object name is already taken.
    pub fn create_network(
        &mut self,
        name: &str,
        kind: NetworkKind,
        srid: i32,
        has_z: bool,
        allow_coincident: bool,
    ) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.create_network(&mut tx, name, kind, srid, has_z, allow_coincident)?;
        tx.commit()?;
        Ok(())
    }

    /// Drop a network and all its data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidNetworkName`] if the network is not
    /// registered.
    pub fn drop_network(&mut self, name: &str) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.drop_network(&mut tx, name)?;
        tx.commit()?;
        Ok(())
    }

    /// Check whether a network is registered.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn network_exists(&self, name: &str) -> Result<bool> {
        let tx = self.engine.begin_read()?;
        let canonical = name.to_lowercase();
        Ok(RegistryStore::get(&tx, &canonical)?.is_some())
    }

    /// The registry row for a network, if registered.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn network_info(&self, name: &str) -> Result<Option<NetworkInfo>> {
        let tx = self.engine.begin_read()?;
        let canonical = name.to_lowercase();
        Ok(RegistryStore::get(&tx, &canonical)?)
    }

    /// Add an isolated node. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::add_iso_net_node`].
    pub fn add_iso_net_node(&mut self, net: &str, geom: Option<&Geometry>) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.add_iso_net_node(&mut tx, net, geom)?;
        tx.commit()?;
        Ok(id)
    }

    /// Relocate an isolated node.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::move_iso_net_node`].
    pub fn move_iso_net_node(
        &mut self,
        net: &str,
        node: NodeId,
        geom: Option<&Geometry>,
    ) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.move_iso_net_node(&mut tx, net, node, geom)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove an isolated node.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::rem_iso_net_node`].
    pub fn rem_iso_net_node(&mut self, net: &str, node: NodeId) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.rem_iso_net_node(&mut tx, net, node)?;
        tx.commit()?;
        Ok(())
    }

    /// Add a link between two existing nodes. Returns the new link's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::add_link`].
    pub fn add_link(
        &mut self,
        net: &str,
        start: NodeId,
        end: NodeId,
        geom: Option<&Geometry>,
    ) -> Result<LinkId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.add_link(&mut tx, net, start, end, geom)?;
        tx.commit()?;
        Ok(id)
    }

    /// Replace a link's geometry.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::change_link_geom`].
    pub fn change_link_geom(
        &mut self,
        net: &str,
        link: LinkId,
        geom: Option<&Geometry>,
    ) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.change_link_geom(&mut tx, net, link, geom)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove a link.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::remove_link`].
    pub fn remove_link(&mut self, net: &str, link: LinkId) -> Result<()> {
        let mut tx = self.engine.begin_write()?;
        self.manager.remove_link(&mut tx, net, link)?;
        tx.commit()?;
        Ok(())
    }

    /// Split a logical link into two new links. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::new_log_link_split`].
    pub fn new_log_link_split(&mut self, net: &str, link: LinkId) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.new_log_link_split(&mut tx, net, link)?;
        tx.commit()?;
        Ok(id)
    }

    /// Split a logical link, truncating it in place. Returns the new
    /// node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::mod_log_link_split`].
    pub fn mod_log_link_split(&mut self, net: &str, link: LinkId) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.mod_log_link_split(&mut tx, net, link)?;
        tx.commit()?;
        Ok(id)
    }

    /// Split a spatial link at a point on its geometry, producing two new
    /// links. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::new_geo_link_split`].
    pub fn new_geo_link_split(
        &mut self,
        net: &str,
        link: LinkId,
        point: &Geometry,
    ) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.new_geo_link_split(&mut tx, net, link, point)?;
        tx.commit()?;
        Ok(id)
    }

    /// Split a spatial link at a point on its geometry, truncating it in
    /// place. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::mod_geo_link_split`].
    pub fn mod_geo_link_split(
        &mut self,
        net: &str,
        link: LinkId,
        point: &Geometry,
    ) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.mod_geo_link_split(&mut tx, net, link, point)?;
        tx.commit()?;
        Ok(id)
    }

    /// Heal two links into one new link. Returns the removed node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::new_link_heal`].
    pub fn new_link_heal(&mut self, net: &str, link1: LinkId, link2: LinkId) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.new_link_heal(&mut tx, net, link1, link2)?;
        tx.commit()?;
        Ok(id)
    }

    /// Heal two links by extending the first in place. Returns the removed
    /// node's id.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::mod_link_heal`].
    pub fn mod_link_heal(&mut self, net: &str, link1: LinkId, link2: LinkId) -> Result<NodeId> {
        let mut tx = self.engine.begin_write()?;
        let id = self.manager.mod_link_heal(&mut tx, net, link1, link2)?;
        tx.commit()?;
        Ok(id)
    }

    /// The nearest node within `tolerance` of `point`, or `None`.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::find_node_by_point`].
    pub fn find_node_by_point(
        &mut self,
        net: &str,
        point: &Geometry,
        tolerance: f64,
    ) -> Result<Option<NodeId>> {
        let tx = self.engine.begin_read()?;
        self.manager.find_node_by_point(&tx, net, point, tolerance)
    }

    /// The nearest link within `tolerance` of `point`, or `None`.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::find_link_by_point`].
    pub fn find_link_by_point(
        &mut self,
        net: &str,
        point: &Geometry,
        tolerance: f64,
    ) -> Result<Option<LinkId>> {
        let tx = self.engine.begin_read()?;
        self.manager.find_link_by_point(&tx, net, point, tolerance)
    }

    /// Scan a logical network for discrepancies.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::check_logical_net`].
    pub fn check_logical_net(&mut self, net: &str) -> Result<ValidityReport> {
        let tx = self.engine.begin_read()?;
        self.manager.check_logical_net(&tx, net)
    }

    /// Scan a spatial network for discrepancies.
    ///
    /// # Errors
    ///
    /// See [`NetworkManager::check_spatial_net`].
    pub fn check_spatial_net(&mut self, net: &str) -> Result<ValidityReport> {
        let tx = self.engine.begin_read()?;
        self.manager.check_spatial_net(&tx, net)
    }

    /// The recorded engine error for a network, if any.
    #[must_use]
    pub fn last_error(&self, net: &str) -> Option<&str> {
        self.manager.last_error(net)
    }

    /// Destroy a network's session handle. Returns `true` if one was
    /// loaded. The next operation on the network reloads it from the
    /// registry.
    pub fn release_network(&mut self, net: &str) -> bool {
        self.manager.release_network(net)
    }
}
