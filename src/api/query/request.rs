// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! QueryRequest type for POST /v1/query

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Longest question accepted, in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Request body for POST /v1/query
///
/// # Fields
/// - `question`: Natural-language question, 1-2000 characters
/// - `session_id`: Session owning the documents to search
/// - `doc_ids`: Restrict the search to these documents (default: whole session)
/// - `llm_provider`: LLM backend name (default: configured provider)
/// - `top_k`: Total results to retrieve (default: configured, bounded by config)
/// - `include_sources`: Attach source citations to the answer (default: true)
///
/// # Example
/// ```json
/// {
///   "question": "What does chapter 3 say about erosion?",
///   "session_id": "b4f9...",
///   "doc_ids": ["1c2e..."],
///   "top_k": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,

    pub session_id: String,

    #[serde(default)]
    pub doc_ids: Option<Vec<String>>,

    #[serde(default)]
    pub llm_provider: Option<String>,

    #[serde(default)]
    pub top_k: Option<usize>,

    #[serde(default = "default_include_sources")]
    pub include_sources: bool,
}

fn default_include_sources() -> bool {
    true
}

impl QueryRequest {
    /// Validates the query request
    ///
    /// `max_top_k` comes from configuration so operators can widen or
    /// narrow the retrieval bound without a rebuild.
    pub fn validate(&self, max_top_k: usize) -> Result<(), ApiError> {
        if self.question.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "question".to_string(),
                message: "question cannot be empty or contain only whitespace".to_string(),
            });
        }

        let question_chars = self.question.trim().chars().count();
        if question_chars > MAX_QUESTION_CHARS {
            return Err(ApiError::ValidationError {
                field: "question".to_string(),
                message: format!(
                    "question cannot exceed {} characters (got {})",
                    MAX_QUESTION_CHARS, question_chars
                ),
            });
        }

        if self.session_id.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "session_id".to_string(),
                message: "session_id cannot be empty".to_string(),
            });
        }

        if let Some(top_k) = self.top_k {
            if top_k == 0 || top_k > max_top_k {
                return Err(ApiError::ValidationError {
                    field: "top_k".to_string(),
                    message: format!("top_k must be between 1 and {} (got {})", max_top_k, top_k),
                });
            }
        }

        Ok(())
    }

    /// The question with surrounding whitespace removed
    pub fn question_trimmed(&self) -> &str {
        self.question.trim()
    }
}
