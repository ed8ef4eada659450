// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-document retrieval
//!
//! Fans a query vector out across many per-document indexes, takes the
//! best `top_k_per_doc` hits from each, then re-ranks the pooled
//! candidates globally by similarity score. Candidate work is bounded at
//! `docs * top_k_per_doc` no matter how many documents a session holds.
//! A document that fails to load or query is skipped with a warning so
//! one bad document never sinks the whole search.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rag::document_index::similarity_score;
use crate::rag::errors::RagError;
use crate::rag::index_store::IndexStore;

/// Per-document queries in flight at once during a multi-document search
const DEFAULT_QUERY_CONCURRENCY: usize = 8;

/// One retrieved chunk, scored and ready for ranking or display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: String,
    pub chunk_id: String,
    pub text: String,
    /// Similarity in (0, 1], computed as `1 / (1 + distance)`
    pub score: f32,
    pub page_num: Option<u32>,
    /// Side-channel fields: chunk_index, char_count, raw distance
    pub extra: HashMap<String, serde_json::Value>,
}

pub struct RetrievalEngine {
    store: Arc<IndexStore>,
    concurrency: usize,
}

impl RetrievalEngine {
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self {
            store,
            concurrency: DEFAULT_QUERY_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Search several documents and merge their best chunks into one
    /// globally ranked list
    ///
    /// Documents are queried in bounded concurrency. Results are sorted by
    /// score descending; ties break by the chunk's rank within its own
    /// document, then by `doc_id`, so identical inputs always produce the
    /// same ordering. At most `max_total` results are returned.
    pub async fn search_multi(
        &self,
        doc_ids: &[String],
        query: &[f32],
        top_k_per_doc: usize,
        max_total: usize,
    ) -> Result<Vec<SearchResult>, RagError> {
        if top_k_per_doc == 0 {
            return Err(RagError::InvalidQuery {
                reason: "top_k_per_doc must be greater than zero".to_string(),
            });
        }
        if max_total == 0 {
            return Err(RagError::InvalidQuery {
                reason: "max_total must be greater than zero".to_string(),
            });
        }
        if query.is_empty() {
            return Err(RagError::InvalidQuery {
                reason: "query vector is empty".to_string(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(RagError::InvalidQuery {
                reason: "query vector contains non-finite values".to_string(),
            });
        }

        tracing::debug!(
            "multi-document search: {} documents, top_k_per_doc={}, max_total={}",
            doc_ids.len(),
            top_k_per_doc,
            max_total
        );

        let outcomes: Vec<(String, Result<Vec<(SearchResult, usize)>, RagError>)> =
            futures::stream::iter(doc_ids.iter().cloned().map(|doc_id| async move {
                let hits = self.query_document(&doc_id, query, top_k_per_doc).await;
                (doc_id, hits)
            }))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut pooled: Vec<(SearchResult, usize)> = Vec::new();
        for (doc_id, outcome) in outcomes {
            match outcome {
                Ok(hits) => pooled.extend(hits),
                Err(e) => {
                    tracing::warn!("skipping document {} in multi-document search: {}", doc_id, e);
                }
            }
        }

        pooled.sort_by(|(a, a_rank), (b, b_rank)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a_rank.cmp(b_rank))
                .then(a.doc_id.cmp(&b.doc_id))
        });
        pooled.truncate(max_total);

        Ok(pooled.into_iter().map(|(result, _)| result).collect())
    }

    /// Query one document, pairing each hit with its rank inside that
    /// document's result list
    async fn query_document(
        &self,
        doc_id: &str,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<(SearchResult, usize)>, RagError> {
        let index = self.store.get(doc_id).await?;

        // Exact nearest-neighbor scan is CPU-bound; keep it off the
        // async executor threads.
        let query = query.to_vec();
        let hits = tokio::task::spawn_blocking(move || index.query(&query, top_k))
            .await
            .map_err(|e| RagError::Other(format!("retrieval task failed: {}", e)))??;

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(rank, (chunk, distance))| {
                let mut extra = HashMap::new();
                extra.insert("chunk_index".to_string(), json!(chunk.chunk_index));
                extra.insert("char_count".to_string(), json!(chunk.char_count));
                extra.insert("distance".to_string(), json!(distance));
                let result = SearchResult {
                    doc_id: chunk.doc_id,
                    chunk_id: chunk.chunk_id,
                    text: chunk.text,
                    score: similarity_score(distance),
                    page_num: chunk.page_num,
                    extra,
                };
                (result, rank)
            })
            .collect())
    }
}
