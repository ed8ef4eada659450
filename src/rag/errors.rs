// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for document indexing and retrieval
//!
//! Covers the full lifecycle of a per-document vector index:
//! - Chunking configuration errors (invalid strategy, overlap >= size)
//! - Index construction errors (count/dimension mismatches, empty documents)
//! - Store errors (missing documents, storage I/O)
//! - Query errors (invalid k, wrong query dimension)

use thiserror::Error;

use crate::storage::StorageError;

/// Errors raised by the chunking, indexing and retrieval core
#[derive(Error, Debug)]
pub enum RagError {
    /// Invalid chunking or retrieval configuration; never retried
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Chunk and vector counts differ when building an index
    #[error("Chunk/vector count mismatch for document {doc_id}: {chunks} chunks, {vectors} vectors")]
    DimensionMismatch {
        doc_id: String,
        chunks: usize,
        vectors: usize,
    },

    /// A vector's length deviates from the dimension set by the first vector
    #[error("Inconsistent dimension for document {doc_id}: vector {position} has {actual} dimensions, expected {expected}")]
    InconsistentDimension {
        doc_id: String,
        position: usize,
        expected: usize,
        actual: usize,
    },

    /// A vector contains values that would poison distance calculations
    #[error("Invalid vector {position} for document {doc_id}: {reason}")]
    InvalidVector {
        doc_id: String,
        position: usize,
        reason: String,
    },

    /// Attempt to build an index over zero chunks
    #[error("Document {doc_id} has no chunks to index")]
    EmptyDocument { doc_id: String },

    /// Document absent from both cache and durable storage
    #[error("Document not found: {doc_id}")]
    NotFound { doc_id: String },

    /// Durable storage read/write failed; distinct from NotFound
    #[error("Storage failure for document {doc_id}: {source}")]
    Storage {
        doc_id: String,
        #[source]
        source: StorageError,
    },

    /// Index blob could not be encoded or decoded
    #[error("Serialization failed for document {doc_id}: {reason}")]
    Serialization { doc_id: String, reason: String },

    /// Malformed query parameters (k == 0, wrong dimension, non-finite values)
    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Generic error for unexpected failures
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl RagError {
    /// Get user-friendly error message for API responses
    pub fn user_message(&self) -> String {
        match self {
            RagError::Configuration { reason } => {
                format!("Invalid configuration: {}", reason)
            }
            RagError::DimensionMismatch {
                doc_id,
                chunks,
                vectors,
            } => {
                format!(
                    "Document '{}' could not be indexed: {} chunks but {} embedding vectors",
                    doc_id, chunks, vectors
                )
            }
            RagError::InconsistentDimension {
                doc_id,
                expected,
                actual,
                ..
            } => {
                format!(
                    "Document '{}' has mixed embedding dimensions ({} and {})",
                    doc_id, expected, actual
                )
            }
            RagError::EmptyDocument { doc_id } => {
                format!("Document '{}' contains no indexable text", doc_id)
            }
            RagError::NotFound { doc_id } => {
                format!("Document not found: {}", doc_id)
            }
            RagError::Storage { doc_id, .. } => {
                format!("Storage failure while accessing document '{}'", doc_id)
            }
            _ => self.to_string(),
        }
    }

    /// Get error code for logging and metrics
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::Configuration { .. } => "CONFIGURATION_ERROR",
            RagError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            RagError::InconsistentDimension { .. } => "INCONSISTENT_DIMENSION",
            RagError::InvalidVector { .. } => "INVALID_VECTOR",
            RagError::EmptyDocument { .. } => "EMPTY_DOCUMENT",
            RagError::NotFound { .. } => "NOT_FOUND",
            RagError::Storage { .. } => "STORAGE_IO_ERROR",
            RagError::Serialization { .. } => "SERIALIZATION_FAILED",
            RagError::InvalidQuery { .. } => "INVALID_QUERY",
            RagError::Other(_) => "OTHER",
        }
    }

    /// Check if this error is retryable
    ///
    /// Only storage I/O failures are transient; every other kind is a
    /// deterministic property of the inputs and retrying cannot help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::Storage { .. })
    }

    /// The doc_id this error concerns, when there is one
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            RagError::DimensionMismatch { doc_id, .. }
            | RagError::InconsistentDimension { doc_id, .. }
            | RagError::InvalidVector { doc_id, .. }
            | RagError::EmptyDocument { doc_id }
            | RagError::NotFound { doc_id }
            | RagError::Storage { doc_id, .. }
            | RagError::Serialization { doc_id, .. } => Some(doc_id),
            _ => None,
        }
    }
}
