//! File-backed durable storage for the Marquee booking portal.
//!
//! This crate provides [`FileStorage`], an implementation of the
//! `KeyValueStorage` trait from `marquee-core` that keeps one file per key
//! under a base directory. It is the durable local storage of the portal:
//! small, string-valued, process-external, and surviving restarts — the
//! session identity lives under the `user` key, the booking ledger under
//! `bookings`.
//!
//! Values are written with plain `std::fs` calls; this storage backs a
//! single-process demo, not shared state, so no cross-process locking is
//! attempted.
//!
//! # Example
//!
//! ```no_run
//! use marquee_core::environment::KeyValueStorage;
//! use marquee_storage::FileStorage;
//!
//! # fn example() -> Result<(), marquee_core::environment::StorageError> {
//! let storage = FileStorage::new("/tmp/marquee")?;
//! storage.set("bookings", "[1,2]")?;
//! assert_eq!(storage.get("bookings")?.as_deref(), Some("[1,2]"));
//! # Ok(())
//! # }
//! ```

use marquee_core::environment::{KeyValueStorage, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-per-key durable storage rooted at a base directory
///
/// Keys are restricted to `[A-Za-z0-9._-]` so every key maps to exactly one
/// file directly under the base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `base_dir`, creating the directory if
    /// needed
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// The directory the storage files live in
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.base_dir.join(key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tracing::trace!(key, bytes = value.len(), "writing storage entry");
        fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Removing an absent key is a no-op
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
