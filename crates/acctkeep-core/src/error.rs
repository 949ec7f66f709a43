//! Error types for the core library.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
