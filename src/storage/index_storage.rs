// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durable blob storage for serialized document indexes
//!
//! One blob per document, keyed by doc_id. The filesystem backend is the
//! production path; the in-memory backend serves tests and ephemeral
//! deployments, including error injection for exercising I/O failure paths.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Extension for index blob files
const BLOB_EXTENSION: &str = "idx";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Backend-agnostic blob storage keyed by doc_id
///
/// `get` fails with `NotFound` for absent keys; `delete` reports absence
/// through its boolean instead. Implementations must make `put` replace
/// the previous blob atomically so a concurrent reader never sees a
/// partially written one.
#[async_trait]
pub trait IndexStorage: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Keys become file names, so anything resembling a path is rejected.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "key must not contain '..': {}",
            key
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(StorageError::InvalidKey(format!(
            "key contains characters outside [A-Za-z0-9._-]: {}",
            key
        )));
    }
    Ok(())
}

/// Filesystem-backed blob storage
///
/// Blobs live as `<root>/<key>.idx`. Writes go to a uniquely named temp
/// file first and are renamed into place, so replacement is atomic.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, BLOB_EXTENSION)))
    }

    fn io_error(path: &std::path::Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl IndexStorage for FsStorage {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let path = self.blob_path(key)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::io_error(&self.root, e))?;

        let tmp = self.root.join(format!(
            "{}.{}.{}.tmp",
            key,
            BLOB_EXTENSION,
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| Self::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;

        tracing::debug!("stored {} bytes at {}", data.len(), path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.blob_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.blob_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.blob_path(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Self::io_error(&path, e))
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.root, e)),
        };

        let suffix = format!(".{}", BLOB_EXTENSION);
        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::io_error(&self.root, e))?
        {
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if let Some(key) = name.strip_suffix(&suffix) {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-memory blob storage for tests and ephemeral deployments
///
/// Supports one-shot error injection: the injected error is returned by the
/// next storage operation, then cleared.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    injected_error: Arc<Mutex<Option<StorageError>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next storage operation fail with `error`
    pub async fn inject_error(&self, error: StorageError) {
        *self.injected_error.lock().await = Some(error);
    }

    async fn check_injected_error(&self) -> Result<(), StorageError> {
        if let Some(error) = self.injected_error.lock().await.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl IndexStorage for MemoryStorage {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.check_injected_error().await?;
        validate_key(key)?;
        self.blobs.lock().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.check_injected_error().await?;
        validate_key(key)?;
        self.blobs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.check_injected_error().await?;
        validate_key(key)?;
        Ok(self.blobs.lock().await.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.check_injected_error().await?;
        validate_key(key)?;
        Ok(self.blobs.lock().await.contains_key(key))
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        self.check_injected_error().await?;
        let mut keys: Vec<String> = self.blobs.lock().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
