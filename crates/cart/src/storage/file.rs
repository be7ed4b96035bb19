//! File-backed storage that mimics browser `localStorage`.
//!
//! The whole store is one JSON object, `{"key": "value", ...}`. Every write
//! rewrites the file: the new contents go to a sibling `*.tmp` file, are
//! synced to disk and then renamed over the original. A failed write removes
//! the temp file and leaves the previous contents in place.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{KeyValueStorage, StorageError};

/// A JSON file of string keys to string values.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStorage {
    /// Use the file at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
                key: String::from("*"),
                source,
            })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        if let Err(e) = replace_with(&tmp_path, &self.path, contents.as_bytes()) {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path)
                && cleanup.kind() != ErrorKind::NotFound
            {
                warn!(path = %tmp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e.into());
        }

        debug!(path = %self.path.display(), keys = entries.len(), "Storage file written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn replace_with(tmp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(tmp_path, path)
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        assert_eq!(storage.get("@RocketShoes:cart").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        FileStorage::new(&path).set("@RocketShoes:cart", "[]").unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("@RocketShoes:cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.set("a", "3").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_remove_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set("a", "1").unwrap();
        storage.remove("a").unwrap();
        storage.remove("never-set").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/deeper/storage.json"));
        storage.set("a", "1").unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        storage.set("a", "1").unwrap();
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_cleans_up_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        // A non-empty directory cannot be replaced by a file
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let storage = FileStorage::new(&path);
        let entries = BTreeMap::from([("a".to_string(), "1".to_string())]);
        assert!(storage.write_entries(&entries).is_err());
        assert!(!dir.path().join("storage.json.tmp").exists());
        assert!(path.join("occupied").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        let err = storage.get("a").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
