// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response types for the document management endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::documents::DocumentRecord;

/// One document in a session listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    pub filename: String,
    pub file_size: u64,
    pub num_pages: usize,
    pub chunk_count: usize,
    pub upload_timestamp: DateTime<Utc>,
    pub embedding_provider: String,
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(record: DocumentRecord) -> Self {
        Self {
            doc_id: record.doc_id,
            filename: record.filename,
            file_size: record.file_size,
            num_pages: record.num_pages,
            chunk_count: record.chunk_count,
            upload_timestamp: record.upload_timestamp,
            embedding_provider: record.embedding_provider,
        }
    }
}

/// Response body for GET /v1/documents/{session_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub session_id: String,
    pub documents: Vec<DocumentSummary>,
    pub total_count: usize,
}

/// Response body for DELETE /v1/documents/{doc_id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub doc_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_serialization() {
        let response = DocumentListResponse {
            session_id: "s1".to_string(),
            documents: vec![DocumentSummary {
                doc_id: "d1".to_string(),
                filename: "a.pdf".to_string(),
                file_size: 2048,
                num_pages: 2,
                chunk_count: 5,
                upload_timestamp: Utc::now(),
                embedding_provider: "ollama".to_string(),
            }],
            total_count: 1,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""session_id":"s1""#));
        assert!(json.contains(r#""total_count":1"#));
        assert!(json.contains(r#""embedding_provider":"ollama""#));
    }
}
