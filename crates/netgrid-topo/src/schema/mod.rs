//! Schema management: the network registry, the object catalog, and the
//! geometry-column registrations.
//!
//! Every network owns six tables (elements, geometry indexes, adjacency
//! indexes) whose names derive from the network name. The catalog records
//! which object names exist and who owns them, which is what makes
//! existence checks and collision detection possible before any element
//! row is touched.

use netgrid_core::encoding::{keys, ByteReader, Decoder, Encoder, FORMAT_VERSION};
use netgrid_core::{CoreError, NetworkConfig, NetworkInfo};
use netgrid_storage::Transaction;

use crate::error::{TopoError, TopoResult};
use crate::store::RegistryStore;

/// Table name for the object catalog.
pub const TABLE_CATALOG: &str = "catalog";

/// Table name for geometry-column registrations.
pub const TABLE_GEOMETRIES: &str = "geometry_columns";

/// The kind of a cataloged schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// The node element table.
    NodeTable,
    /// The link element table.
    LinkTable,
    /// The node geometry index.
    NodeGeomIndex,
    /// The link geometry index.
    LinkGeomIndex,
    /// The link-by-start adjacency index.
    LinkStartIndex,
    /// The link-by-end adjacency index.
    LinkEndIndex,
}

impl ObjectKind {
    const fn code(self) -> u8 {
        match self {
            Self::NodeTable => 0,
            Self::LinkTable => 1,
            Self::NodeGeomIndex => 2,
            Self::LinkGeomIndex => 3,
            Self::LinkStartIndex => 4,
            Self::LinkEndIndex => 5,
        }
    }

    fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(Self::NodeTable),
            1 => Ok(Self::LinkTable),
            2 => Ok(Self::NodeGeomIndex),
            3 => Ok(Self::LinkGeomIndex),
            4 => Ok(Self::LinkStartIndex),
            5 => Ok(Self::LinkEndIndex),
            other => Err(CoreError::encoding(format!("unknown object kind: {other}"))),
        }
    }
}

/// The resolved table names for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetTables {
    /// Canonical network name.
    pub network: String,
    /// Node element table.
    pub nodes: String,
    /// Link element table.
    pub links: String,
    /// Node geometry index.
    pub node_geom_idx: String,
    /// Link geometry index.
    pub link_geom_idx: String,
    /// Adjacency index keyed by start node.
    pub link_by_start: String,
    /// Adjacency index keyed by end node.
    pub link_by_end: String,
}

impl NetTables {
    /// Derive the table names for a canonical network name.
    #[must_use]
    pub fn for_network(name: &str) -> Self {
        Self {
            network: name.to_owned(),
            nodes: format!("{name}_node"),
            links: format!("{name}_link"),
            node_geom_idx: format!("idx_{name}_node_geom"),
            link_geom_idx: format!("idx_{name}_link_geom"),
            link_by_start: format!("{name}_link_start"),
            link_by_end: format!("{name}_link_end"),
        }
    }

    /// Every owned object name, paired with its catalog kind.
    #[must_use]
    pub fn objects(&self) -> [(&str, ObjectKind); 6] {
        [
            (&self.nodes, ObjectKind::NodeTable),
            (&self.links, ObjectKind::LinkTable),
            (&self.node_geom_idx, ObjectKind::NodeGeomIndex),
            (&self.link_geom_idx, ObjectKind::LinkGeomIndex),
            (&self.link_by_start, ObjectKind::LinkStartIndex),
            (&self.link_by_end, ObjectKind::LinkEndIndex),
        ]
    }

    /// Every owned table name.
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            &self.nodes,
            &self.links,
            &self.node_geom_idx,
            &self.link_geom_idx,
            &self.link_by_start,
            &self.link_by_end,
        ]
    }

    /// The geometry-bearing tables.
    #[must_use]
    pub fn geometry_tables(&self) -> [&str; 2] {
        [&self.nodes, &self.links]
    }
}

/// A catalog row: the owning network and the object's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CatalogEntry {
    kind: ObjectKind,
    owner: String,
}

impl Encoder for CatalogEntry {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        buf.push(self.kind.code());
        let len = u32::try_from(self.owner.len())
            .map_err(|_| CoreError::encoding("owner name too long"))?;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(self.owner.as_bytes());
        Ok(())
    }
}

impl Decoder for CatalogEntry {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        r.expect_version(FORMAT_VERSION)?;
        let kind = ObjectKind::from_code(r.take_u8()?)?;
        let owner = r.take_string()?;
        Ok(Self { kind, owner })
    }
}

/// A geometry-column registration: SRID and dimensionality of a
/// geometry-bearing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GeomRegistration {
    srid: i32,
    has_z: bool,
}

impl Encoder for GeomRegistration {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&self.srid.to_be_bytes());
        buf.push(u8::from(self.has_z));
        Ok(())
    }
}

impl Decoder for GeomRegistration {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut r = ByteReader::new(bytes);
        r.expect_version(FORMAT_VERSION)?;
        let srid = r.take_i32()?;
        let has_z = r.take_u8()? != 0;
        Ok(Self { srid, has_z })
    }
}

/// Canonicalize a caller-supplied network name.
///
/// Names are case-insensitive and stored lowercase. Empty names and names
/// containing quote characters or NUL are rejected.
///
/// # Errors
///
/// Returns [`TopoError::NullArgument`] for an empty name and
/// [`TopoError::InvalidArgument`] for a malformed one.
pub fn canonical_name(name: &str) -> TopoResult<String> {
    if name.is_empty() {
        return Err(TopoError::NullArgument("network name"));
    }
    if name.contains(['\'', '"', '`', '\0']) {
        return Err(TopoError::invalid_argument(
            "network name must not contain quote characters",
        ));
    }
    Ok(name.to_lowercase())
}

/// Create a network: catalog entries, geometry registrations (spatial
/// only), and the registry row.
///
/// The caller wraps this in a savepoint so a failure at any step leaves no
/// partial schema behind.
///
/// # Errors
///
/// Returns [`TopoError::NameConflict`] if the network or any derived
/// object name is already registered.
pub fn create_network<T: Transaction>(tx: &mut T, config: &NetworkConfig) -> TopoResult<()> {
    if RegistryStore::get(tx, &config.name)?.is_some() {
        return Err(TopoError::NameConflict(config.name.clone()));
    }

    let tables = NetTables::for_network(&config.name);
    for (object, _) in tables.objects() {
        if tx.get(TABLE_CATALOG, &keys::name_key(object))?.is_some() {
            return Err(TopoError::NameConflict(object.to_owned()));
        }
    }
    for table in tables.geometry_tables() {
        if tx.get(TABLE_GEOMETRIES, &keys::name_key(table))?.is_some() {
            return Err(TopoError::NameConflict(table.to_owned()));
        }
    }

    for (object, kind) in tables.objects() {
        let entry = CatalogEntry { kind, owner: config.name.clone() };
        tx.put(TABLE_CATALOG, &keys::name_key(object), &entry.encode()?)?;
    }
    if config.kind.is_spatial() {
        let reg = GeomRegistration { srid: config.srid, has_z: config.has_z };
        for table in tables.geometry_tables() {
            tx.put(TABLE_GEOMETRIES, &keys::name_key(table), &reg.encode()?)?;
        }
    }

    RegistryStore::put(tx, &NetworkInfo::new(config.clone()))?;
    Ok(())
}

/// Drop a network: element data, catalog entries, geometry registrations,
/// and the registry row.
///
/// # Errors
///
/// Returns [`TopoError::InvalidNetworkName`] if the network is not
/// registered.
pub fn drop_network<T: Transaction>(tx: &mut T, name: &str) -> TopoResult<()> {
    validate_existing(&*tx, name, false)?;

    let tables = NetTables::for_network(name);
    for table in tables.all() {
        tx.clear_table(table)?;
    }
    for (object, _) in tables.objects() {
        tx.delete(TABLE_CATALOG, &keys::name_key(object))?;
    }
    for table in tables.geometry_tables() {
        tx.delete(TABLE_GEOMETRIES, &keys::name_key(table))?;
    }
    RegistryStore::delete(tx, name)?;
    Ok(())
}

/// Confirm a network exists and, with `full_check`, that every schema
/// object agrees with the registry row.
///
/// `full_check = false` only confirms the registry row (used by drop);
/// `full_check = true` also verifies the six catalog entries and the
/// geometry registrations (used before loading an accessor).
///
/// # Errors
///
/// Returns [`TopoError::InvalidNetworkName`] when the registry row is
/// absent or the schema objects disagree with it.
pub fn validate_existing<T: Transaction>(
    tx: &T,
    name: &str,
    full_check: bool,
) -> TopoResult<NetworkInfo> {
    let info = RegistryStore::get(tx, name)?
        .ok_or_else(|| TopoError::InvalidNetworkName(name.to_owned()))?;
    if !full_check {
        return Ok(info);
    }

    let tables = NetTables::for_network(name);
    for (object, kind) in tables.objects() {
        let bytes = tx.get(TABLE_CATALOG, &keys::name_key(object))?.ok_or_else(|| {
            TopoError::InvalidNetworkName(format!("{name}: missing schema object {object}"))
        })?;
        let entry = CatalogEntry::decode(&bytes)?;
        if entry.owner != name || entry.kind != kind {
            return Err(TopoError::InvalidNetworkName(format!(
                "{name}: schema object {object} is registered to another owner"
            )));
        }
    }

    for table in tables.geometry_tables() {
        let reg = tx.get(TABLE_GEOMETRIES, &keys::name_key(table))?;
        if info.config.kind.is_spatial() {
            let bytes = reg.ok_or_else(|| {
                TopoError::InvalidNetworkName(format!(
                    "{name}: missing geometry registration for {table}"
                ))
            })?;
            let reg = GeomRegistration::decode(&bytes)?;
            if reg.srid != info.config.srid || reg.has_z != info.config.has_z {
                return Err(TopoError::InvalidNetworkName(format!(
                    "{name}: geometry registration for {table} disagrees with the registry"
                )));
            }
        } else if reg.is_some() {
            return Err(TopoError::InvalidNetworkName(format!(
                "{name}: unexpected geometry registration for {table}"
            )));
        }
    }

    Ok(info)
}
