// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-document vector index
//!
//! One `DocumentIndex` holds a document's chunks, their embedding vectors
//! and document-level metadata. Built once per upload (full rebuild, never
//! incrementally mutated) and queried with exact brute-force L2 search.
//! Serializes to a single bincode blob whose round-trip is bit-identical
//! for the vectors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::rag::chunker::Chunk;
use crate::rag::errors::RagError;

/// Convert a distance to a similarity score in (0, 1]
///
/// `score = 1 / (1 + distance)`: 1.0 at distance zero, monotonically
/// decreasing. A simple proxy, not a calibrated probability.
pub fn similarity_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// Exact-search vector index for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndex {
    doc_id: String,
    dimension: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    extra_metadata: HashMap<String, String>,
}

impl DocumentIndex {
    /// Build an index from chunks and their embedding vectors
    ///
    /// The vectors must align one-to-one with the chunks; the dimension is
    /// inferred from the first vector.
    ///
    /// # Errors
    /// * `EmptyDocument` - no chunks to index
    /// * `DimensionMismatch` - chunk and vector counts differ
    /// * `InconsistentDimension` - a vector's length deviates from the first
    /// * `InvalidVector` - a vector is empty or contains NaN/infinite values
    pub fn build(
        doc_id: impl Into<String>,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        extra_metadata: HashMap<String, String>,
    ) -> Result<Self, RagError> {
        let doc_id = doc_id.into();

        if chunks.is_empty() {
            return Err(RagError::EmptyDocument { doc_id });
        }
        if chunks.len() != vectors.len() {
            return Err(RagError::DimensionMismatch {
                doc_id,
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(RagError::InvalidVector {
                doc_id,
                position: 0,
                reason: "empty embedding vector".to_string(),
            });
        }

        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(RagError::InconsistentDimension {
                    doc_id,
                    position,
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(RagError::InvalidVector {
                    doc_id,
                    position,
                    reason: "contains NaN or infinite values".to_string(),
                });
            }
        }

        tracing::debug!(
            "built index for {}: {} chunks, dimension {}",
            doc_id,
            chunks.len(),
            dimension
        );

        Ok(Self {
            doc_id,
            dimension,
            chunks,
            vectors,
            extra_metadata,
        })
    }

    /// Find the k nearest chunks to the query vector
    ///
    /// Exact brute-force search over every vector in the index. Distances
    /// are squared L2; the score map `1/(1+d)` keeps the ordering identical
    /// to true L2.
    ///
    /// # Returns
    /// `(chunk, distance)` pairs sorted by ascending distance, at most
    /// `min(k, chunk_count)` of them.
    ///
    /// # Errors
    /// `InvalidQuery` when k is 0, the query dimension does not match the
    /// index, or the query contains non-finite values.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(Chunk, f32)>, RagError> {
        if k == 0 {
            return Err(RagError::InvalidQuery {
                reason: "k must be greater than zero".to_string(),
            });
        }
        if query.len() != self.dimension {
            return Err(RagError::InvalidQuery {
                reason: format!(
                    "query has {} dimensions, index for {} has {}",
                    query.len(),
                    self.doc_id,
                    self.dimension
                ),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(RagError::InvalidQuery {
                reason: "query vector contains NaN or infinite values".to_string(),
            });
        }

        let mut hits: Vec<(Chunk, f32)> = self
            .vectors
            .iter()
            .zip(self.chunks.iter())
            .map(|(vector, chunk)| {
                let distance: f32 = vector
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (chunk.clone(), distance)
            })
            .collect();

        // Stable sort: equal distances keep chunk order for determinism
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k.min(self.chunks.len()));

        Ok(hits)
    }

    /// Encode the index into a single storage blob
    pub fn to_bytes(&self) -> Result<Vec<u8>, RagError> {
        bincode::serialize(self).map_err(|e| RagError::Serialization {
            doc_id: self.doc_id.clone(),
            reason: e.to_string(),
        })
    }

    /// Decode an index previously encoded with [`to_bytes`](Self::to_bytes)
    ///
    /// `doc_id` is the key the blob was stored under; a decoded index
    /// carrying a different id means the blob is corrupt or misplaced.
    pub fn from_bytes(doc_id: &str, bytes: &[u8]) -> Result<Self, RagError> {
        let index: DocumentIndex =
            bincode::deserialize(bytes).map_err(|e| RagError::Serialization {
                doc_id: doc_id.to_string(),
                reason: e.to_string(),
            })?;

        if index.doc_id != doc_id {
            return Err(RagError::Serialization {
                doc_id: doc_id.to_string(),
                reason: format!("blob belongs to document '{}'", index.doc_id),
            });
        }

        Ok(index)
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn extra_metadata(&self) -> &HashMap<String, String> {
        &self.extra_metadata
    }
}
