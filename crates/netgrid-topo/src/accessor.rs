//! Network accessors and the session-scoped cache.
//!
//! An accessor is the per-session runtime handle for one network: the
//! cached configuration, the resolved table names, and the last-error
//! slot. The cache owns every live accessor for a session, keyed by
//! canonical name, with at most one accessor per network per session.
//!
//! Loading goes through the full schema check; a network that fails the
//! check never produces an accessor, so a cached accessor is always
//! usable. Dropping the cache (or the session owning it) destroys every
//! accessor.

use std::collections::HashMap;

use netgrid_core::NetworkConfig;
use netgrid_storage::Transaction;

use crate::error::TopoResult;
use crate::schema::{self, NetTables};

/// The runtime handle for one network within one session.
#[derive(Debug)]
pub struct NetworkAccessor {
    config: NetworkConfig,
    tables: NetTables,
    last_error: Option<String>,
}

impl NetworkAccessor {
    fn new(config: NetworkConfig, tables: NetTables) -> Self {
        Self { config, tables, last_error: None }
    }

    /// The network's declared configuration.
    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The network's resolved table names.
    #[must_use]
    pub fn tables(&self) -> &NetTables {
        &self.tables
    }

    /// The recorded engine error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Record an engine error.
    ///
    /// The slot is sticky: the first error of a failed operation is kept
    /// and later writes are ignored until [`Self::reset_error`]. Callers
    /// therefore always read the failure that started a cascade, not the
    /// last symptom of it.
    pub fn record_error(&mut self, msg: impl Into<String>) {
        if self.last_error.is_none() {
            self.last_error = Some(msg.into());
        }
    }

    /// Clear the error slot. Called at the start of every operation on
    /// this network.
    pub fn reset_error(&mut self) {
        self.last_error = None;
    }
}

/// The session-scoped collection of live accessors.
#[derive(Debug, Default)]
pub struct AccessorCache {
    accessors: HashMap<String, NetworkAccessor>,
}

impl AccessorCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the accessor for `name`, loading it on a miss.
    ///
    /// A load validates the full schema (registry row, catalog entries,
    /// geometry registrations) and reads the registry row; on failure
    /// nothing is cached and the error surfaces to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TopoError::InvalidNetworkName`] when the network
    /// does not exist or its schema is inconsistent.
    pub fn get_or_load<T: Transaction>(
        &mut self,
        tx: &T,
        name: &str,
    ) -> TopoResult<&mut NetworkAccessor> {
        if !self.accessors.contains_key(name) {
            let info = schema::validate_existing(tx, name, true)?;
            let tables = NetTables::for_network(name);
            self.accessors.insert(name.to_owned(), NetworkAccessor::new(info.config, tables));
        }
        // Just inserted on the miss path; the map cannot miss here.
        self.accessors
            .get_mut(name)
            .ok_or_else(|| crate::TopoError::InvalidNetworkName(name.to_owned()))
    }

    /// The accessor for `name`, if loaded.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NetworkAccessor> {
        self.accessors.get(name)
    }

    /// The accessor for `name`, if loaded, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut NetworkAccessor> {
        self.accessors.get_mut(name)
    }

    /// Check whether an accessor for `name` is loaded.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Destroy the accessor for `name`. Returns `true` if one was loaded.
    pub fn release(&mut self, name: &str) -> bool {
        self.accessors.remove(name).is_some()
    }

    /// Destroy every accessor.
    pub fn clear(&mut self) {
        self.accessors.clear();
    }
}

#[cfg(test)]
mod tests {
    use netgrid_core::NetworkKind;

    use super::*;

    fn accessor() -> NetworkAccessor {
        let config = NetworkConfig::new("net", NetworkKind::Logical, -1, false, false);
        NetworkAccessor::new(config, NetTables::for_network("net"))
    }

    #[test]
    fn first_error_sticks() {
        let mut acc = accessor();
        acc.record_error("first failure");
        acc.record_error("second failure");
        assert_eq!(acc.last_error(), Some("first failure"));
    }

    #[test]
    fn reset_clears_the_slot() {
        let mut acc = accessor();
        acc.record_error("failure");
        acc.reset_error();
        assert_eq!(acc.last_error(), None);
        acc.record_error("later failure");
        assert_eq!(acc.last_error(), Some("later failure"));
    }
}
