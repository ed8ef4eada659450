// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cache and persistence for per-document indexes
//!
//! Maps doc_id to an immutable `Arc<DocumentIndex>` snapshot, backed by
//! durable blob storage. The cache is purely a performance layer: every
//! index is persisted on `put`, and a cache miss reloads from storage.
//! Writers install a whole new snapshot per document, so a reader holding
//! an `Arc` never observes a torn index, and operations on different
//! documents never contend on a store-wide lock.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::rag::chunker::Chunk;
use crate::rag::document_index::DocumentIndex;
use crate::rag::errors::RagError;
use crate::storage::{IndexStorage, StorageError};

pub struct IndexStore {
    cache: DashMap<String, Arc<DocumentIndex>>,
    storage: Arc<dyn IndexStorage>,
}

impl IndexStore {
    pub fn new(storage: Arc<dyn IndexStorage>) -> Self {
        Self {
            cache: DashMap::new(),
            storage,
        }
    }

    /// Build and register the index for a document
    ///
    /// Replaces any existing entry for `doc_id` in both the cache and
    /// durable storage; there is no merge with a prior version. On any
    /// failure neither the cache nor storage is touched, so a failed put
    /// never leaves a partially registered document behind.
    pub async fn put(
        &self,
        doc_id: &str,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        extra_metadata: HashMap<String, String>,
    ) -> Result<Arc<DocumentIndex>, RagError> {
        let index = DocumentIndex::build(doc_id, chunks, vectors, extra_metadata)?;
        let bytes = index.to_bytes()?;

        self.storage
            .put(doc_id, bytes)
            .await
            .map_err(|e| storage_error(doc_id, e))?;

        let index = Arc::new(index);
        self.cache.insert(doc_id.to_string(), index.clone());

        tracing::info!(
            "indexed document {}: {} chunks, dimension {}",
            doc_id,
            index.chunk_count(),
            index.dimension()
        );
        Ok(index)
    }

    /// Fetch a document's index, loading it from storage on a cache miss
    ///
    /// Two concurrent callers missing the cache for the same doc_id may
    /// both load; the first insert wins and both get equivalent snapshots.
    pub async fn get(&self, doc_id: &str) -> Result<Arc<DocumentIndex>, RagError> {
        if let Some(entry) = self.cache.get(doc_id) {
            return Ok(entry.value().clone());
        }

        tracing::debug!("cache miss for {}, loading from storage", doc_id);
        let bytes = self.storage.get(doc_id).await.map_err(|e| match e {
            StorageError::NotFound(_) => RagError::NotFound {
                doc_id: doc_id.to_string(),
            },
            other => storage_error(doc_id, other),
        })?;

        let index = Arc::new(DocumentIndex::from_bytes(doc_id, &bytes)?);
        let entry = self
            .cache
            .entry(doc_id.to_string())
            .or_insert_with(|| index.clone());
        Ok(entry.value().clone())
    }

    /// Remove a document's index from cache and durable storage
    ///
    /// Returns whether a durable entry existed. Deleting an unknown doc_id
    /// is not an error.
    pub async fn delete(&self, doc_id: &str) -> Result<bool, RagError> {
        self.cache.remove(doc_id);
        let existed = self
            .storage
            .delete(doc_id)
            .await
            .map_err(|e| storage_error(doc_id, e))?;

        if existed {
            tracing::info!("deleted index for document {}", doc_id);
        }
        Ok(existed)
    }

    /// Whether the document is present in cache or durable storage,
    /// without loading it
    pub async fn exists(&self, doc_id: &str) -> Result<bool, RagError> {
        if self.cache.contains_key(doc_id) {
            return Ok(true);
        }
        self.storage
            .exists(doc_id)
            .await
            .map_err(|e| storage_error(doc_id, e))
    }

    /// Drop every cached index. Stored blobs are untouched; subsequent
    /// gets reload from storage.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of indexes currently cached in memory
    pub fn size(&self) -> usize {
        self.cache.len()
    }
}

fn storage_error(doc_id: &str, source: StorageError) -> RagError {
    RagError::Storage {
        doc_id: doc_id.to_string(),
        source,
    }
}
