//! Persistent reference cache
//!
//! One JSON object per namespace directory, mapping
//! `"<owner>/<name>@<version>"` to `{"sha": ..., "updated_at": ...}`.
//! The file is rewritten as a full snapshot on every update.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::CACHE_FILE_NAME;
use crate::pin::error::CacheError;

/// Resolved commit for one reference string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub sha: String,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Reference string -> entry, in file order
pub type CacheMap = IndexMap<String, CacheEntry>;

/// A cache namespace backed by `<dir>/cache.json`
pub struct CacheStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE_NAME)
    }

    /// Acquire the write lock with proper error handling
    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, CacheError> {
        self.write_lock.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Load the whole namespace. A missing file is an empty cache.
    pub fn load(&self) -> Result<CacheMap, CacheError> {
        let path = self.file_path();
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {:?}", path);
                return Ok(CacheMap::new());
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        serde_json::from_slice(&data).map_err(|source| CacheError::Corrupt { path, source })
    }

    /// Write a full snapshot, creating the namespace directory if needed.
    ///
    /// The snapshot goes to a temp file in the same directory and is renamed
    /// over `cache.json`, so a reader sees either the old or the new file.
    pub fn save(&self, entries: &CacheMap) -> Result<(), CacheError> {
        let _guard = self.lock_writes()?;
        self.save_locked(entries)
    }

    /// Set `key` to `sha` stamped with the current time and persist the map.
    pub fn upsert(&self, key: &str, sha: &str) -> Result<CacheEntry, CacheError> {
        let _guard = self.lock_writes()?;

        let mut entries = self.load()?;
        let entry = CacheEntry::new(sha);
        entries.insert(key.to_string(), entry.clone());
        self.save_locked(&entries)?;

        debug!("Cached {} -> {}", key, sha);
        Ok(entry)
    }

    /// Whether `cache.json` exists as a regular file
    pub fn exists(&self) -> bool {
        self.file_path().is_file()
    }

    fn save_locked(&self, entries: &CacheMap) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let buf = serde_json::to_vec_pretty(entries)?;
        let io_err = |source| CacheError::Io {
            path: self.file_path(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        file.write_all(&buf).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(self.file_path())?;

        Ok(())
    }
}
