//! Error types for rolematrix

use thiserror::Error;

/// The main error type for rolematrix operations
#[derive(Debug, Error)]
pub enum Error {
    /// A toggle was attempted while the session is read-only
    #[error("edit session is not editable")]
    NotEditable,

    /// A toggle named a (role, resource, action) cell absent from the matrix
    #[error("no matrix cell for role `{role}` at `{resource}:{action}`")]
    InvalidToggleTarget {
        role: String,
        resource: String,
        action: String,
    },

    /// The store was used before `store::init`
    #[error("store not initialized, call store::init first")]
    NotInitialized,

    /// `store::init` was called a second time with a different path
    #[error("store already initialized at {0}")]
    AlreadyInitialized(String),

    /// An underlying storage failure (LMDB, filesystem, encoding)
    #[error("storage: {0}")]
    Storage(String),
}

/// Result type alias for rolematrix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Convert any storage-layer error to `Error::Storage`
pub(crate) fn err<E: std::error::Error>(e: E) -> Error {
    Error::Storage(e.to_string())
}
