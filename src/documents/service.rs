// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document lifecycle: upload, listing, deletion
//!
//! Upload runs the full ingestion pipeline: extract text, chunk page by
//! page, embed, build and persist the vector index, then write the
//! ownership record. Chunking each page separately keeps every chunk's
//! page attribution exact instead of approximated from offsets.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::documents::record::{DocumentRecord, MetadataError, MetadataStore};
use crate::embeddings::{EmbeddingError, EmbeddingRegistry};
use crate::extract::{self, ExtractError};
use crate::rag::chunker::Chunk;
use crate::rag::errors::RagError;
use crate::rag::index_store::IndexStore;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File size ({size} bytes) exceeds maximum ({max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Failed to store original file: {0}")]
    FileStore(std::io::Error),
}

pub struct DocumentService {
    config: Arc<Config>,
    index_store: Arc<IndexStore>,
    metadata: Arc<MetadataStore>,
    embeddings: Arc<EmbeddingRegistry>,
}

impl DocumentService {
    pub fn new(
        config: Arc<Config>,
        index_store: Arc<IndexStore>,
        metadata: Arc<MetadataStore>,
        embeddings: Arc<EmbeddingRegistry>,
    ) -> Self {
        Self {
            config,
            index_store,
            metadata,
            embeddings,
        }
    }

    /// Ingest an uploaded file into the session
    ///
    /// The index write is all-or-nothing; a failure anywhere in the
    /// pipeline registers no document. `embedding_provider` selects a
    /// configured provider by name, defaulting per configuration.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        session_id: &str,
        embedding_provider: Option<&str>,
    ) -> Result<DocumentRecord, DocumentError> {
        let size = data.len() as u64;
        let max = self.config.documents.max_file_size_bytes() as u64;
        if size > max {
            return Err(DocumentError::FileTooLarge { size, max });
        }

        // Resolve the provider before paying for extraction
        let provider = self.embeddings.resolve(embedding_provider)?;

        let doc_id = Uuid::new_v4().to_string();
        let extracted = extract::extract(filename, &data).await?;

        self.store_original(&doc_id, filename, &data).await?;

        let chunking = &self.config.chunking;
        let mut chunks: Vec<Chunk> = Vec::new();
        for page in &extracted.pages {
            for piece in crate::rag::chunk(
                &page.text,
                &doc_id,
                chunking.strategy,
                chunking.chunk_size,
                chunking.chunk_overlap,
                None,
            )? {
                let index = chunks.len();
                chunks.push(Chunk::assemble(&doc_id, index, piece.text, Some(page.page_num)));
            }
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_documents(&texts).await?;

        let mut extra_metadata = HashMap::new();
        extra_metadata.insert("filename".to_string(), filename.to_string());
        extra_metadata.insert("embedding_provider".to_string(), provider.name().to_string());
        extra_metadata.insert("num_pages".to_string(), extracted.num_pages.to_string());

        let chunk_count = chunks.len();
        self.index_store
            .put(&doc_id, chunks, vectors, extra_metadata)
            .await?;

        let record = DocumentRecord {
            doc_id: doc_id.clone(),
            session_id: session_id.to_string(),
            filename: filename.to_string(),
            file_size: size,
            num_pages: extracted.num_pages,
            chunk_count,
            embedding_provider: provider.name().to_string(),
            upload_timestamp: Utc::now(),
        };
        if let Err(e) = self.metadata.save(&record).await {
            // Without a record the index is unreachable; remove it so the
            // failed upload leaves nothing behind.
            if let Err(cleanup) = self.index_store.delete(&doc_id).await {
                warn!("Failed to clean up index for {}: {}", doc_id, cleanup);
            }
            return Err(e.into());
        }

        info!(
            "Uploaded document {} ({}): {} pages, {} chunks",
            doc_id, filename, extracted.num_pages, chunk_count
        );
        Ok(record)
    }

    pub async fn get(&self, doc_id: &str) -> Result<Option<DocumentRecord>, DocumentError> {
        Ok(self.metadata.get(doc_id).await?)
    }

    pub async fn list_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<DocumentRecord>, DocumentError> {
        Ok(self.metadata.list_by_session(session_id).await?)
    }

    /// Delete a document the session owns
    ///
    /// Returns `false` when the document does not exist or belongs to a
    /// different session; callers surface both the same way so the API
    /// does not leak which documents exist.
    pub async fn delete(&self, doc_id: &str, session_id: &str) -> Result<bool, DocumentError> {
        let record = match self.metadata.get(doc_id).await? {
            Some(record) => record,
            None => {
                warn!("Document {} not found", doc_id);
                return Ok(false);
            }
        };

        if record.session_id != session_id {
            warn!("Session {} not authorized to delete {}", session_id, doc_id);
            return Ok(false);
        }

        self.index_store.delete(doc_id).await?;
        self.remove_original(doc_id, &record.filename).await;
        self.metadata.delete(doc_id).await?;

        info!("Deleted document {}", doc_id);
        Ok(true)
    }

    async fn store_original(
        &self,
        doc_id: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), DocumentError> {
        let path = self.original_path(doc_id, filename);
        tokio::fs::create_dir_all(&self.config.storage.documents_dir)
            .await
            .map_err(DocumentError::FileStore)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(DocumentError::FileStore)
    }

    // Original-file cleanup is best effort; the record and index removals
    // are what make the document gone.
    async fn remove_original(&self, doc_id: &str, filename: &str) {
        let path = self.original_path(doc_id, filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove original file {}: {}", path.display(), e),
        }
    }

    fn original_path(&self, doc_id: &str, filename: &str) -> std::path::PathBuf {
        let ext = extract::file_extension(filename).unwrap_or_else(|| "bin".to_string());
        self.config
            .storage
            .documents_dir
            .join(format!("{}.{}", doc_id, ext))
    }
}
