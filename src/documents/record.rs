// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-document ownership and bookkeeping records
//!
//! One JSON file per document under the metadata directory. Records carry
//! the session scoping and display fields; the searchable content lives
//! in the index blobs, keyed by the same doc_id. A record that fails to
//! parse is treated as absent rather than poisoning every listing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record for {doc_id}: {reason}")]
    Serialization { doc_id: String, reason: String },

    #[error("Invalid document id: {0}")]
    InvalidDocId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    pub session_id: String,
    pub filename: String,
    pub file_size: u64,
    pub num_pages: usize,
    pub chunk_count: usize,
    /// Provider that embedded this document; queries must use the same one
    pub embedding_provider: String,
    pub upload_timestamp: DateTime<Utc>,
}

pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn save(&self, record: &DocumentRecord) -> Result<(), MetadataError> {
        if !valid_doc_id(&record.doc_id) {
            return Err(MetadataError::InvalidDocId(record.doc_id.clone()));
        }

        let json =
            serde_json::to_vec_pretty(record).map_err(|e| MetadataError::Serialization {
                doc_id: record.doc_id.clone(),
                reason: e.to_string(),
            })?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        let path = self.record_path(&record.doc_id);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    /// Load one record; unknown and unreadable records both come back as
    /// `None`
    pub async fn get(&self, doc_id: &str) -> Result<Option<DocumentRecord>, MetadataError> {
        if !valid_doc_id(doc_id) {
            return Ok(None);
        }

        let path = self.record_path(doc_id);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        match serde_json::from_slice(&data) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Skipping unreadable metadata for {}: {}", doc_id, e);
                Ok(None)
            }
        }
    }

    /// All records for a session, newest upload first
    pub async fn list_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<DocumentRecord>, MetadataError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = match tokio::fs::read(&path).await {
                Ok(data) => data,
                Err(e) => {
                    warn!("Failed to read metadata file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<DocumentRecord>(&data) {
                Ok(record) if record.session_id == session_id => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping unreadable metadata file {}: {}", path.display(), e);
                }
            }
        }

        records.sort_by(|a, b| b.upload_timestamp.cmp(&a.upload_timestamp));
        debug!("Found {} documents for session {}", records.len(), session_id);
        Ok(records)
    }

    /// Remove a record, reporting whether it existed
    pub async fn delete(&self, doc_id: &str) -> Result<bool, MetadataError> {
        if !valid_doc_id(doc_id) {
            return Ok(false);
        }

        let path = self.record_path(doc_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn record_path(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", doc_id))
    }
}

// Doc ids become file names, so they are restricted to a safe charset.
fn valid_doc_id(doc_id: &str) -> bool {
    !doc_id.is_empty()
        && !doc_id.contains("..")
        && doc_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn io_error(path: &std::path::Path, source: std::io::Error) -> MetadataError {
    MetadataError::Io {
        path: path.display().to_string(),
        source,
    }
}
