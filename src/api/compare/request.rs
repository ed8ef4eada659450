// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ComparisonRequest type for POST /v1/compare

use crate::api::query::request::MAX_QUESTION_CHARS;
use crate::api::ApiError;
use serde::{Deserialize, Serialize};

pub const MIN_COMPARE_DOCS: usize = 2;
pub const MAX_COMPARE_DOCS: usize = 10;

/// Request body for POST /v1/compare
///
/// # Fields
/// - `question`: Question to ask every document, 1-2000 characters
/// - `doc_ids`: Documents to compare, 2-10 entries
/// - `session_id`: Session owning the documents
/// - `llm_provider`: LLM backend name (default: configured provider)
///
/// # Example
/// ```json
/// {
///   "question": "What warranty terms apply?",
///   "doc_ids": ["1c2e...", "9a3b..."],
///   "session_id": "b4f9..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub question: String,

    pub doc_ids: Vec<String>,

    pub session_id: String,

    #[serde(default)]
    pub llm_provider: Option<String>,
}

impl ComparisonRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
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

        let doc_ids = self.doc_ids_trimmed();
        if doc_ids.len() < MIN_COMPARE_DOCS {
            return Err(ApiError::InvalidRequest(
                "At least 2 documents required for comparison".to_string(),
            ));
        }
        if doc_ids.len() > MAX_COMPARE_DOCS {
            return Err(ApiError::InvalidRequest(
                "Maximum 10 documents for comparison".to_string(),
            ));
        }

        Ok(())
    }

    /// Document ids with whitespace and empty entries removed
    pub fn doc_ids_trimmed(&self) -> Vec<String> {
        self.doc_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    }

    pub fn question_trimmed(&self) -> &str {
        self.question.trim()
    }
}
