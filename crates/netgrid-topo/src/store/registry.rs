//! Registry row storage and id allocation.
//!
//! The original schema maintained the `next_*_id` counters with
//! insert/update triggers on the element tables; here the bump is explicit
//! in the allocation and observation calls, preserving the same invariant:
//! a counter never decreases and always exceeds every id present in the
//! corresponding table.

use netgrid_core::encoding::{keys, Decoder, Encoder};
use netgrid_core::{LinkId, NetworkInfo, NodeId};
use netgrid_storage::Transaction;

use crate::error::{TopoError, TopoResult};

/// Table name for the network registry.
pub const TABLE_REGISTRY: &str = "networks";

/// Registry row operations.
pub struct RegistryStore;

impl RegistryStore {
    /// Get a registry row by canonical network name.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or a corrupt row.
    pub fn get<T: Transaction>(tx: &T, name: &str) -> TopoResult<Option<NetworkInfo>> {
        match tx.get(TABLE_REGISTRY, &keys::name_key(name))? {
            Some(bytes) => Ok(Some(NetworkInfo::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write a registry row.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn put<T: Transaction>(tx: &mut T, info: &NetworkInfo) -> TopoResult<()> {
        tx.put(TABLE_REGISTRY, &keys::name_key(&info.config.name), &info.encode()?)?;
        Ok(())
    }

    /// Delete a registry row. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub fn delete<T: Transaction>(tx: &mut T, name: &str) -> TopoResult<bool> {
        Ok(tx.delete(TABLE_REGISTRY, &keys::name_key(name))?)
    }

    fn get_required<T: Transaction>(tx: &T, name: &str) -> TopoResult<NetworkInfo> {
        Self::get(tx, name)?.ok_or_else(|| TopoError::InvalidNetworkName(name.to_owned()))
    }

    /// Allocate the next node id, bumping the counter.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidNetworkName`] if the registry row is
    /// absent.
    pub fn allocate_node_id<T: Transaction>(tx: &mut T, name: &str) -> TopoResult<NodeId> {
        let mut info = Self::get_required(&*tx, name)?;
        let id = info.next_node_id;
        info.next_node_id = id + 1;
        Self::put(tx, &info)?;
        Ok(NodeId::new(id))
    }

    /// Allocate the next link id, bumping the counter.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidNetworkName`] if the registry row is
    /// absent.
    pub fn allocate_link_id<T: Transaction>(tx: &mut T, name: &str) -> TopoResult<LinkId> {
        let mut info = Self::get_required(&*tx, name)?;
        let id = info.next_link_id;
        info.next_link_id = id + 1;
        Self::put(tx, &info)?;
        Ok(LinkId::new(id))
    }

    /// Raise the node counter past `id` if it is not already there.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidNetworkName`] if the registry row is
    /// absent.
    pub fn observe_node_id<T: Transaction>(tx: &mut T, name: &str, id: NodeId) -> TopoResult<()> {
        let mut info = Self::get_required(&*tx, name)?;
        if id.as_u64() >= info.next_node_id {
            info.next_node_id = id.as_u64() + 1;
            Self::put(tx, &info)?;
        }
        Ok(())
    }

    /// Raise the link counter past `id` if it is not already there.
    ///
    /// # Errors
    ///
    /// Returns [`TopoError::InvalidNetworkName`] if the registry row is
    /// absent.
    pub fn observe_link_id<T: Transaction>(tx: &mut T, name: &str, id: LinkId) -> TopoResult<()> {
        let mut info = Self::get_required(&*tx, name)?;
        if id.as_u64() >= info.next_link_id {
            info.next_link_id = id.as_u64() + 1;
            Self::put(tx, &info)?;
        }
        Ok(())
    }
}
