// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::FavoritesError;

/// Durable key/value storage backing the favorites store
pub trait FavoritesStorage {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError>;

    /// Durably replace the value under `key` before returning
    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError>;
}

/// Stores each key as `<key>.json` inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default per-user location, `None` if the platform has no data directory
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("podshelf"))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl FavoritesStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FavoritesError::ReadFailed { path, source: e }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| FavoritesError::WriteFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path_for(key);
        let partial_path = path.with_extension("json.partial");

        // Write to a .partial file and rename so readers never see half a file
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&partial_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&partial_path, &path)
        };

        write().map_err(|e| {
            let _ = std::fs::remove_file(&partial_path);
            FavoritesError::WriteFailed {
                path: path.clone(),
                source: e,
            }
        })?;

        // The rename itself is only durable once the directory entry is synced
        sync_dir(&self.dir).map_err(|e| FavoritesError::WriteFailed {
            path: self.dir.clone(),
            source: e,
        })
    }
}

/// Flush directory metadata so a completed rename survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directory handles cannot be opened for syncing here
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-process storage; clones share the same underlying map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. to simulate what a previous session left behind
    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

impl FavoritesStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        let values = self
            .values
            .lock()
            .map_err(|e| FavoritesError::StorageUnavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), FavoritesError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| FavoritesError::StorageUnavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load("favorites").unwrap().is_none());
    }

    #[test]
    fn file_storage_write_and_read() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.save("favorites", "[]").unwrap();
        assert_eq!(storage.load("favorites").unwrap().as_deref(), Some("[]"));

        storage.save("favorites", "[1]").unwrap();
        assert_eq!(storage.load("favorites").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn file_storage_save_is_visible_to_a_fresh_handle() {
        let dir = tempdir().unwrap();
        FileStorage::new(dir.path()).save("favorites", "[2]").unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.load("favorites").unwrap().as_deref(), Some("[2]"));
    }

    #[cfg(unix)]
    #[test]
    fn directory_sync_needs_an_existing_directory() {
        let dir = tempdir().unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn file_storage_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.save("favorites", "[]").unwrap();

        assert!(dir.path().join("favorites.json").exists());
        assert!(!dir.path().join("favorites.json.partial").exists());
    }

    #[test]
    fn file_storage_reports_unwritable_location() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let storage = FileStorage::new(&blocker);
        let err = storage.save("favorites", "[]").unwrap_err();
        assert!(matches!(err, FavoritesError::WriteFailed { .. }));
    }

    #[test]
    fn memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.save("favorites", "[]").unwrap();
        assert_eq!(other.load("favorites").unwrap().as_deref(), Some("[]"));
    }
}
