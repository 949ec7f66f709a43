//! Persistent key-value storage.
//!
//! The account store keeps its whole list in a single string slot. Any
//! backend that can get and set strings by key will do.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write would exceed the backend's quota.
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// Key cannot be used with this backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Synchronous string-valued key-value storage.
pub trait KeyValueStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected or fails.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}
