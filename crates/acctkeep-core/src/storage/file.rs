//! File-backed storage: one JSON file per key in a data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStorage, StorageError, StorageResult};

/// File extension for stored slots.
const EXTENSION: &str = "json";

/// Storage that keeps each key in `<dir>/<key>.json`.
///
/// The directory is created on first write. Values are written to a
/// temporary sibling and renamed into place, so a failed write leaves the
/// previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if the key is not a safe file name.
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Keys become file names: ASCII alphanumerics, `-`, `_` and `.`, not
/// starting with `.`.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("accounts"));
        assert!(is_valid_key("accounts-v1.backup"));
        assert!(is_valid_key("user_42"));
    }

    #[test]
    fn test_invalid_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key(".hidden"));
        assert!(!is_valid_key("../escape"));
        assert!(!is_valid_key("a/b"));
        assert!(!is_valid_key("with space"));
    }

    #[test]
    fn test_get_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("accounts").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut storage = FileStorage::new(&nested);

        storage.set("accounts", "[]").unwrap();

        assert!(nested.join("accounts.json").exists());
        assert!(!nested.join("accounts.json.tmp").exists());
        assert_eq!(storage.get("accounts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.set("../x", "v"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get("a/b"), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set("accounts", "[]").unwrap();
        // A directory at the temp path makes the write itself fail
        fs::create_dir(dir.path().join("accounts.json.tmp")).unwrap();

        assert!(matches!(
            storage.set("accounts", "[1]"),
            Err(StorageError::Io(_))
        ));
        assert_eq!(storage.get("accounts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        // A non-empty directory at the target path makes the rename fail
        fs::create_dir(dir.path().join("accounts.json")).unwrap();
        fs::write(dir.path().join("accounts.json").join("f"), "x").unwrap();

        assert!(matches!(
            storage.set("accounts", "[]"),
            Err(StorageError::Io(_))
        ));
        assert!(!dir.path().join("accounts.json.tmp").exists());
    }

    #[test]
    fn test_directory_in_place_of_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("accounts.json")).unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(storage.get("accounts"), Err(StorageError::Io(_))));
    }
}
