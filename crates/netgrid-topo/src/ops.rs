//! The graph mutation protocol.
//!
//! [`NetworkManager`] is the session-scoped entry point for every
//! caller-facing operation. Each mutating operation follows one template:
//!
//! 1. Resolve the network's accessor (loading it on a cache miss).
//! 2. Validate argument shape: geometry must be a single point or a
//!    single polyline as the operation demands.
//! 3. Enforce the spatial/logical contract and any network-kind
//!    restriction the operation carries.
//! 4. Enforce SRID and dimensionality agreement.
//! 5. Reset the accessor's error slot and run the engine call inside a
//!    named savepoint: released on success, rolled back on any failure.
//! 6. Record an engine failure's text on the accessor and surface it.
//!
//! Validation failures (steps 1–4) happen before the savepoint is opened,
//! so they never touch storage; engine failures happen after the rollback,
//! so the caller never observes a half-applied mutation. Savepoint names
//! come from a per-session monotone counter and cannot collide with an
//! enclosing transaction's own savepoints.

use netgrid_core::{Geometry, Line, LinkId, NetworkConfig, NetworkKind, NodeId, Point};
use netgrid_storage::Transaction;

use crate::accessor::AccessorCache;
use crate::backend::{QueryBridge, StorageBridge};
use crate::engine;
use crate::error::{TopoError, TopoResult};
use crate::schema::{self, NetTables};
use crate::store::NetNodeStore;
use crate::validity::{self, ValidityReport};

/// Session-scoped coordinator for network operations: the accessor cache
/// plus the savepoint name sequence.
#[derive(Debug, Default)]
pub struct NetworkManager {
    accessors: AccessorCache,
    savepoint_seq: u64,
}

impl NetworkManager {
    /// Create a manager with an empty accessor cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_savepoint_name(&mut self) -> String {
        self.savepoint_seq += 1;
        format!("netgrid_sp_{}", self.savepoint_seq)
    }

    /// Canonicalize the name, load the accessor, and reset its error slot.
    fn resolve<T: Transaction>(
        &mut self,
        tx: &T,
        net: &str,
    ) -> TopoResult<(String, NetworkConfig, NetTables)> {
        let name = schema::canonical_name(net)?;
        let acc = self.accessors.get_or_load(tx, &name)?;
        acc.reset_error();
        let config = acc.config().clone();
        let tables = acc.tables().clone();
        Ok((name, config, tables))
    }

    /// Record an engine failure on the network's accessor.
    fn capture<R>(&mut self, name: &str, result: TopoResult<R>) -> TopoResult<R> {
        if let Err(TopoError::Engine(msg)) = &result {
            tracing::warn!(network = %name, error = %msg, "network engine rejected the operation");
            if let Some(acc) = self.accessors.get_mut(name) {
                acc.record_error(msg.clone());
            }
        }
        result
    }

    /// Create a network.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::NameConflict`] on a name collision; any step
    /// failure rolls the savepoint back, leaving no partial schema.
    pub fn create_network<T: Transaction>(
        &mut self,
        tx: &mut T,
        name: &str,
        kind: NetworkKind,
        srid: i32,
        has_z: bool,
        allow_coincident: bool,
    ) -> TopoResult<()> {
        let name = schema::canonical_name(name)?;
        let config = NetworkConfig::new(name.clone(), kind, srid, has_z, allow_coincident);
        tracing::debug!(network = %name, kind = %kind, srid, "creating network");
        let sp = self.next_savepoint_name();
        with_savepoint(tx, &sp, |tx| schema::create_network(tx, &config))
    }

    /// Drop a network and release its accessor.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidNetworkName`] if the network is not
    /// registered.
    pub fn drop_network<T: Transaction>(&mut self, tx: &mut T, name: &str) -> TopoResult<()> {
        let name = schema::canonical_name(name)?;
        tracing::debug!(network = %name, "dropping network");
        let sp = self.next_savepoint_name();
        with_savepoint(tx, &sp, |tx| schema::drop_network(tx, &name))?;
        self.accessors.release(&name);
        Ok(())
    }

    /// Add an isolated node. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Follows the protocol template; engine rejections (coincident node)
    /// surface as [`TopoError::Engine`].
    pub fn add_iso_net_node<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        geom: Option<&Geometry>,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let point = validate_point_arg(&config, geom)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::add_iso_net_node(&mut bridge, point.as_ref())
        });
        self.capture(&name, result)
    }

    /// Relocate an isolated node.
    ///
    /// # Errors
    ///
    /// Follows the protocol template; engine rejections (missing node,
    /// node not isolated, coincident target) surface as
    /// [`TopoError::Engine`].
    pub fn move_iso_net_node<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        node: NodeId,
        geom: Option<&Geometry>,
    ) -> TopoResult<()> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let point = validate_point_arg(&config, geom)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::move_iso_net_node(&mut bridge, node, point.as_ref())
        });
        self.capture(&name, result)
    }

    /// Remove an isolated node.
    ///
    /// # Errors
    ///
    /// Follows the protocol template; engine rejections (missing node,
    /// node not isolated) surface as [`TopoError::Engine`].
    pub fn rem_iso_net_node<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        node: NodeId,
    ) -> TopoResult<()> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::rem_iso_net_node(&mut bridge, node)
        });
        self.capture(&name, result)
    }

    /// Add a link between two existing nodes. Returns the new link's id.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidArgument`] if either node does not
    /// exist; endpoint-geometry mismatches surface as
    /// [`TopoError::Engine`].
    pub fn add_link<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        start: NodeId,
        end: NodeId,
        geom: Option<&Geometry>,
    ) -> TopoResult<LinkId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let line = validate_line_arg(&config, geom)?;
        for (node, role) in [(start, "start"), (end, "end")] {
            if !NetNodeStore::exists(&*tx, &tables, node)? {
                return Err(TopoError::invalid_argument(format!(
                    "{role} node {node} does not exist"
                )));
            }
        }
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::add_link(&mut bridge, start, end, line.as_ref())
        });
        self.capture(&name, result)
    }

    /// Replace a link's geometry.
    ///
    /// # Errors
    ///
    /// Follows the protocol template; engine rejections (missing link,
    /// endpoint mismatch) surface as [`TopoError::Engine`].
    pub fn change_link_geom<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
        geom: Option<&Geometry>,
    ) -> TopoResult<()> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let line = validate_line_arg(&config, geom)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::change_link_geom(&mut bridge, link, line.as_ref())
        });
        self.capture(&name, result)
    }

    /// Remove a link.
    ///
    /// # Errors
    ///
    /// Follows the protocol template; a missing link surfaces as
    /// [`TopoError::Engine`].
    pub fn remove_link<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
    ) -> TopoResult<()> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::remove_link(&mut bridge, link)
        });
        self.capture(&name, result)
    }

    /// Split a logical link into two new links. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a spatial network,
    /// naming `new_geo_link_split` as the alternative.
    pub fn new_log_link_split<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        require_kind("new_log_link_split", &config, NetworkKind::Logical, Some("new_geo_link_split"))?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::new_log_link_split(&mut bridge, link)
        });
        self.capture(&name, result)
    }

    /// Split a logical link, truncating it in place. Returns the new
    /// node's id.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a spatial network,
    /// naming `mod_geo_link_split` as the alternative.
    pub fn mod_log_link_split<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        require_kind("mod_log_link_split", &config, NetworkKind::Logical, Some("mod_geo_link_split"))?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::mod_log_link_split(&mut bridge, link)
        });
        self.capture(&name, result)
    }

    /// Split a spatial link at a point on its geometry, producing two new
    /// links. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a logical network,
    /// naming `new_log_link_split` as the alternative.
    pub fn new_geo_link_split<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
        point: &Geometry,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        require_kind("new_geo_link_split", &config, NetworkKind::Spatial, Some("new_log_link_split"))?;
        let pt = validate_query_point(&config, point)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::new_geo_link_split(&mut bridge, link, &pt)
        });
        self.capture(&name, result)
    }

    /// Split a spatial link at a point on its geometry, truncating it in
    /// place. Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a logical network,
    /// naming `mod_log_link_split` as the alternative.
    pub fn mod_geo_link_split<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link: LinkId,
        point: &Geometry,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        require_kind("mod_geo_link_split", &config, NetworkKind::Spatial, Some("mod_log_link_split"))?;
        let pt = validate_query_point(&config, point)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::mod_geo_link_split(&mut bridge, link, &pt)
        });
        self.capture(&name, result)
    }

    /// Heal two links into one new link. Returns the removed node's id.
    ///
    /// # Errors
    ///
    /// Engine rejections (links not sharing exactly one node, shared node
    /// with other links) surface as [`TopoError::Engine`].
    pub fn new_link_heal<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link1: LinkId,
        link2: LinkId,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::new_link_heal(&mut bridge, link1, link2)
        });
        self.capture(&name, result)
    }

    /// Heal two links by extending the first in place. Returns the removed
    /// node's id.
    ///
    /// # Errors
    ///
    /// Engine rejections (links not sharing exactly one node, shared node
    /// with other links) surface as [`TopoError::Engine`].
    pub fn mod_link_heal<T: Transaction>(
        &mut self,
        tx: &mut T,
        net: &str,
        link1: LinkId,
        link2: LinkId,
    ) -> TopoResult<NodeId> {
        let (name, config, tables) = self.resolve(&*tx, net)?;
        let sp = self.next_savepoint_name();
        let result = with_savepoint(tx, &sp, |tx| {
            let mut bridge = StorageBridge::new(tx, &config, &tables);
            engine::mod_link_heal(&mut bridge, link1, link2)
        });
        self.capture(&name, result)
    }

    /// The nearest node within `tolerance` of `point`, or `None`.
    ///
    /// Read-only; no savepoint is opened.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a logical network.
    pub fn find_node_by_point<T: Transaction>(
        &mut self,
        tx: &T,
        net: &str,
        point: &Geometry,
        tolerance: f64,
    ) -> TopoResult<Option<NodeId>> {
        let (_name, config, tables) = self.resolve(tx, net)?;
        require_kind("find_node_by_point", &config, NetworkKind::Spatial, None)?;
        let pt = validate_query_point(&config, point)?;
        check_tolerance(tolerance)?;
        let bridge = QueryBridge::new(tx, &config, &tables);
        engine::find_node_by_point(&bridge, &pt, tolerance)
    }

    /// The nearest link within `tolerance` of `point`, or `None`.
    ///
    /// Read-only; no savepoint is opened.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a logical network.
    pub fn find_link_by_point<T: Transaction>(
        &mut self,
        tx: &T,
        net: &str,
        point: &Geometry,
        tolerance: f64,
    ) -> TopoResult<Option<LinkId>> {
        let (_name, config, tables) = self.resolve(tx, net)?;
        require_kind("find_link_by_point", &config, NetworkKind::Spatial, None)?;
        let pt = validate_query_point(&config, point)?;
        check_tolerance(tolerance)?;
        let bridge = QueryBridge::new(tx, &config, &tables);
        engine::find_link_by_point(&bridge, &pt, tolerance)
    }

    /// Scan a logical network for discrepancies.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a spatial network,
    /// naming `check_spatial_net` as the alternative.
    pub fn check_logical_net<T: Transaction>(
        &mut self,
        tx: &T,
        net: &str,
    ) -> TopoResult<ValidityReport> {
        let (_name, config, tables) = self.resolve(tx, net)?;
        require_kind("check_logical_net", &config, NetworkKind::Logical, Some("check_spatial_net"))?;
        validity::check_logical(tx, &tables)
    }

    /// Scan a spatial network for discrepancies.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::OperationKindMismatch`] on a logical network,
    /// naming `check_logical_net` as the alternative.
    pub fn check_spatial_net<T: Transaction>(
        &mut self,
        tx: &T,
        net: &str,
    ) -> TopoResult<ValidityReport> {
        let (_name, config, tables) = self.resolve(tx, net)?;
        require_kind("check_spatial_net", &config, NetworkKind::Spatial, Some("check_logical_net"))?;
        validity::check_spatial(tx, &tables)
    }

    /// The recorded engine error for a network, if its accessor is loaded.
    #[must_use]
    pub fn last_error(&self, net: &str) -> Option<&str> {
        let name = schema::canonical_name(net).ok()?;
        self.accessors.get(&name)?.last_error()
    }

    /// Destroy a network's accessor. Returns `true` if one was loaded.
    pub fn release_network(&mut self, net: &str) -> bool {
        match schema::canonical_name(net) {
            Ok(name) => self.accessors.release(&name),
            Err(_) => false,
        }
    }
}

/// Run `f` inside a named savepoint: released on success, rolled back on
/// failure, on every exit path.
fn with_savepoint<T: Transaction, R>(
    tx: &mut T,
    name: &str,
    f: impl FnOnce(&mut T) -> TopoResult<R>,
) -> TopoResult<R> {
    tx.begin_savepoint(name)?;
    match f(tx) {
        Ok(value) => {
            tx.release_savepoint(name)?;
            Ok(value)
        }
        Err(err) => match tx.rollback_savepoint(name) {
            Ok(()) => Err(err),
            // A failing rollback outranks the original error.
            Err(sp_err) => Err(sp_err.into()),
        },
    }
}

fn require_kind(
    operation: &'static str,
    config: &NetworkConfig,
    expected: NetworkKind,
    alternative: Option<&'static str>,
) -> TopoResult<()> {
    if config.kind == expected {
        Ok(())
    } else {
        Err(TopoError::OperationKindMismatch { operation, expected, alternative })
    }
}

fn check_srid_dims(config: &NetworkConfig, geom: &Geometry) -> TopoResult<()> {
    if geom.srid != config.srid {
        return Err(TopoError::MismatchedGeometry(format!(
            "geometry SRID {} does not match network SRID {}",
            geom.srid, config.srid
        )));
    }
    if geom.has_z() != config.has_z {
        let msg = if config.has_z {
            "network is 3D but geometry is 2D"
        } else {
            "network is 2D but geometry is 3D"
        };
        return Err(TopoError::MismatchedGeometry(msg.to_owned()));
    }
    Ok(())
}

fn require_point_shape(geom: &Geometry) -> TopoResult<Point> {
    geom.as_point().copied().ok_or_else(|| {
        TopoError::invalid_argument(format!(
            "expected a point geometry, got a {}",
            geom.shape_name()
        ))
    })
}

fn require_line_shape(geom: &Geometry) -> TopoResult<Line> {
    geom.as_line().cloned().ok_or_else(|| {
        TopoError::invalid_argument(format!(
            "expected a polyline geometry, got a {}",
            geom.shape_name()
        ))
    })
}

/// Validate an optional point argument against the network contract:
/// spatial requires it, logical forbids it.
fn validate_point_arg(
    config: &NetworkConfig,
    geom: Option<&Geometry>,
) -> TopoResult<Option<Point>> {
    match (config.kind.is_spatial(), geom) {
        (true, None) => Err(TopoError::SpatialRequiresGeometry),
        (false, Some(_)) => Err(TopoError::LogicalForbidsGeometry),
        (false, None) => Ok(None),
        (true, Some(g)) => {
            let pt = require_point_shape(g)?;
            check_srid_dims(config, g)?;
            Ok(Some(pt))
        }
    }
}

/// Validate an optional polyline argument against the network contract.
fn validate_line_arg(config: &NetworkConfig, geom: Option<&Geometry>) -> TopoResult<Option<Line>> {
    match (config.kind.is_spatial(), geom) {
        (true, None) => Err(TopoError::SpatialRequiresGeometry),
        (false, Some(_)) => Err(TopoError::LogicalForbidsGeometry),
        (false, None) => Ok(None),
        (true, Some(g)) => {
            let line = require_line_shape(g)?;
            check_srid_dims(config, g)?;
            Ok(Some(line))
        }
    }
}

/// Validate a required point argument (split points, query locations).
fn validate_query_point(config: &NetworkConfig, geom: &Geometry) -> TopoResult<Point> {
    let pt = require_point_shape(geom)?;
    check_srid_dims(config, geom)?;
    Ok(pt)
}

fn check_tolerance(tolerance: f64) -> TopoResult<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(TopoError::invalid_argument("tolerance must be a non-negative finite number"))
    }
}
