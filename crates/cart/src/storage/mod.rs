//! Key-value storage backends for cart persistence.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - In-process map, for tests and embedding
//! - [`FileStorage`] - A JSON file on disk that behaves like browser
//!   `localStorage`: string keys, string values, whole-value overwrite
//!
//! The trait is synchronous. Storage writes are small and local, and the cart
//! store calls them while holding its own lock.

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("Storage file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A previous writer panicked while holding the storage lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Synchronous string key-value store.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Poisoned;
        assert_eq!(err.to_string(), "Storage lock poisoned");

        let io = StorageError::from(std::io::Error::other("disk full"));
        assert_eq!(io.to_string(), "Storage I/O error: disk full");
    }
}
