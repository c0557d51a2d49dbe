//! Element storage operations.
//!
//! The stores provide row-level CRUD for the registry, node, and link
//! tables, keeping the secondary structures (adjacency indexes, geometry
//! indexes, registry counters) synchronized with every write. All
//! operations work within a caller-supplied transaction.
//!
//! Graph invariants (isolation, endpoint matching) are *not* enforced
//! here; that is the network engine's job. The stores only guarantee that
//! a row and its index entries never diverge.

mod link;
mod node;
mod registry;

pub use link::NetLinkStore;
pub use node::NetNodeStore;
pub use registry::{RegistryStore, TABLE_REGISTRY};
