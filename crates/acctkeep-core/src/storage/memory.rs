//! In-memory storage backend.

use std::collections::HashMap;

use super::{KeyValueStorage, StorageError, StorageResult};

/// Storage held in a process-local map.
///
/// An optional quota caps the total size of keys and values in bytes,
/// the way browser local storage does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage limited to `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Change the quota; `None` removes the limit.
    pub const fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Remove the value under `key`, returning it.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            let current = self.entries.get(key).map_or(0, |v| key.len() + v.len());
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_missing() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("accounts").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let mut storage = MemoryStorage::new();
        storage.set("accounts", "[]").unwrap();
        assert_eq!(storage.get("accounts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_replaces() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.used_bytes(), 4);
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.set("k", "12345").unwrap();

        let err = storage.set("k", "0123456789").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded { needed: 11, quota: 10 }
        ));
        // Previous value survives the rejected write
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let mut storage = MemoryStorage::with_quota(6);
        storage.set("k", "12345").unwrap();
        storage.set("k", "54321").unwrap();
    }

    #[test]
    fn remove_entry() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.remove("k").as_deref(), Some("v"));
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
