//! Vantage core types and errors.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod time;

/// Object identity as the raw bytes of `metadata.uid`.
pub type Uid = [u8; 16];

/// Raw cluster object payload. Owned by the caller; wrappers never mutate it.
pub type RawObject = serde_json::Value;

/// Namespace dimension of a list/get operation.
///
/// Cluster-scoped kinds take `Cluster`; namespaced kinds take `All` or a
/// specific namespace. The endpoint factory rejects every other pairing, so
/// downstream code never infers scope from missing values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NamespaceScope {
    Cluster,
    All,
    Namespace(String),
}

impl NamespaceScope {
    /// The specific namespace, when one is addressed.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            NamespaceScope::Namespace(ns) => Some(ns.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespaceScope::Cluster => f.write_str("(cluster)"),
            NamespaceScope::All => f.write_str("(all)"),
            NamespaceScope::Namespace(ns) => f.write_str(ns),
        }
    }
}

/// Errors suitable for transport over a channel boundary.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum VantageError {
    #[error("unknown kind: {0}")]
    UnknownKind(String),
    #[error("duplicate kind: {0}")]
    DuplicateKind(String),
    #[error("invalid scope: {0}")]
    InvalidScope(String),
    #[error("malformed resource: {0}")]
    MalformedResource(String),
    #[error("routing: {0}")]
    Routing(String),
    #[error("transport: {0}")]
    Transport(String),
}

pub type VantageResult<T> = Result<T, VantageError>;

pub mod prelude {
    pub use super::{NamespaceScope, RawObject, Uid, VantageError, VantageResult};
}
