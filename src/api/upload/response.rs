// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! UploadResponse type for POST /v1/documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::documents::DocumentRecord;

/// Response body for POST /v1/documents
///
/// # Fields
/// - `doc_id`: Identifier for querying and deleting the document
/// - `session_id`: Session owning the document (server-generated when the
///   request omitted one, so clients must read it back)
/// - `filename`: Original filename as uploaded
/// - `file_size`: Upload size in bytes
/// - `num_pages`: Pages in the source document
/// - `num_chunks`: Chunks indexed for retrieval
/// - `message`: Human-readable confirmation
/// - `upload_timestamp`: Server time of ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub doc_id: String,
    pub session_id: String,
    pub filename: String,
    pub file_size: u64,
    pub num_pages: usize,
    pub num_chunks: usize,
    pub message: String,
    pub upload_timestamp: DateTime<Utc>,
}

impl From<DocumentRecord> for UploadResponse {
    fn from(record: DocumentRecord) -> Self {
        Self {
            doc_id: record.doc_id,
            session_id: record.session_id,
            filename: record.filename,
            file_size: record.file_size,
            num_pages: record.num_pages,
            num_chunks: record.chunk_count,
            message: "Document uploaded and processed successfully".to_string(),
            upload_timestamp: record.upload_timestamp,
        }
    }
}
