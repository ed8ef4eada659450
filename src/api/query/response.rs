// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! QueryResponse type for POST /v1/query

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::query_service::{QueryOutcome, SourceRef};

/// Response body for POST /v1/query
///
/// # Fields
/// - `answer`: Generated answer (or canned guidance when nothing matched)
/// - `sources`: Citations backing the answer, empty when not requested
/// - `doc_ids_used`: Documents that actually contributed results
/// - `processing_time_ms`: Wall-clock time spent serving the query
/// - `metadata`: Diagnostics such as result count and the LLM provider used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub doc_ids_used: Vec<String>,
    pub processing_time_ms: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            answer: outcome.answer,
            sources: outcome.sources,
            doc_ids_used: outcome.doc_ids_used,
            processing_time_ms: outcome.processing_time_ms,
            metadata: outcome.metadata,
        }
    }
}
