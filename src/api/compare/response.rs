// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ComparisonResponse type for POST /v1/compare

use serde::{Deserialize, Serialize};

use crate::query_service::{ComparisonOutcome, DocumentComparison};

/// Response body for POST /v1/compare
///
/// # Fields
/// - `question`: The question that was asked
/// - `comparisons`: Per-document answers with up to two sources each
/// - `summary`: LLM-generated comparative summary across the answers
/// - `processing_time_ms`: Wall-clock time for the whole comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub question: String,
    pub comparisons: Vec<DocumentComparison>,
    pub summary: String,
    pub processing_time_ms: f64,
}

impl From<ComparisonOutcome> for ComparisonResponse {
    fn from(outcome: ComparisonOutcome) -> Self {
        Self {
            question: outcome.question,
            comparisons: outcome.comparisons,
            summary: outcome.summary,
            processing_time_ms: outcome.processing_time_ms,
        }
    }
}
