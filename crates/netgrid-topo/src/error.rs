//! Error types for the topology layer.

use netgrid_core::{CoreError, NetworkKind};
use netgrid_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in topology operations.
///
/// Validation errors (everything above [`TopoError::Storage`]) are raised
/// before any savepoint is opened, so no storage mutation has been
/// attempted. [`TopoError::Engine`] is raised after the savepoint has been
/// rolled back, so the mutation is guaranteed undone.
#[derive(Debug, Error)]
pub enum TopoError {
    /// The named network is not registered, or its schema objects are
    /// incomplete.
    #[error("invalid network name: {0}")]
    InvalidNetworkName(String),

    /// A required value is missing.
    #[error("missing required argument: {0}")]
    NullArgument(&'static str),

    /// A value has the wrong shape or an out-of-range magnitude.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// SRID or dimensionality disagreement between a supplied geometry and
    /// the network declaration.
    #[error("mismatched geometry: {0}")]
    MismatchedGeometry(String),

    /// A spatial network was given a null geometry.
    #[error("spatial network requires geometry")]
    SpatialRequiresGeometry,

    /// A logical network was given a geometry.
    #[error("logical network forbids geometry")]
    LogicalForbidsGeometry,

    /// An operation was invoked against the wrong network kind.
    #[error("{operation} requires a {expected} network{}", alternative.map(|a| format!("; use {a} instead")).unwrap_or_default())]
    OperationKindMismatch {
        /// The operation that was invoked.
        operation: &'static str,
        /// The kind it is restricted to.
        expected: NetworkKind,
        /// The counterpart operation for the other kind, if one exists.
        alternative: Option<&'static str>,
    },

    /// A schema object name collides with an existing registration.
    #[error("name conflict: {0}")]
    NameConflict(String),

    /// A persisted row could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An underlying storage failure, with the engine's diagnostic text.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The network engine rejected a graph edit. The text is also recorded
    /// on the network's accessor.
    #[error("network engine error: {0}")]
    Engine(String),
}

impl TopoError {
    /// Creates an engine error from any displayable message.
    #[must_use]
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Creates an invalid-argument error from any displayable message.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<CoreError> for TopoError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Encoding(msg) => Self::Encoding(msg),
            // A malformed geometry coming off disk is corruption; caller
            // inputs are validated before they reach the stores.
            CoreError::InvalidGeometry(msg) => Self::Encoding(msg),
            CoreError::Validation(msg) => Self::InvalidArgument(msg),
        }
    }
}

/// Result type for topology operations.
pub type TopoResult<T> = Result<T, TopoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_names_the_alternative() {
        let err = TopoError::OperationKindMismatch {
            operation: "new_log_link_split",
            expected: NetworkKind::Logical,
            alternative: Some("new_geo_link_split"),
        };
        let text = err.to_string();
        assert!(text.contains("logical"));
        assert!(text.contains("new_geo_link_split"));
    }

    #[test]
    fn kind_mismatch_without_alternative() {
        let err = TopoError::OperationKindMismatch {
            operation: "find_node_by_point",
            expected: NetworkKind::Spatial,
            alternative: None,
        };
        assert_eq!(err.to_string(), "find_node_by_point requires a spatial network");
    }
}
