//! Store error types.

use thiserror::Error;

use super::name::NameError;

/// Failures at the persistence boundary.
///
/// These are storage failures, kept distinct from the model's validation
/// errors: a row that fails its schema never surfaces here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted database file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A name unsafe to use as a storage key.
    #[error("invalid database name: {0}")]
    InvalidName(#[from] NameError),
}
