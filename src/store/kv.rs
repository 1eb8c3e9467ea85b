// SPDX-License-Identifier: MIT

//! Key-value storage capability.
//!
//! The platform store is modeled as named blobs with atomic whole-value
//! read/write semantics and no transactions across keys. Two in-tree
//! implementations: an in-memory store for tests and a JSON-file store for
//! running on a real filesystem.

use dashmap::DashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};

/// Named-blob storage, durable across process restarts.
///
/// Handles are cheap clones sharing the same underlying store, so a
/// foreground and a background task can each hold one without sharing any
/// other memory.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Write the blob under `key`, replacing any previous value whole.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// In-memory store for tests and offline use.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.blobs.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per key under a root directory.
///
/// Writes go through a temp file plus rename so a crashed write leaves the
/// previous blob intact rather than a torn one.
#[derive(Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read {key}: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {key}: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to commit {key}: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to remove {key}: {e}"))),
        }
    }
}
