// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Compare endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, warn};

use super::request::ComparisonRequest;
use super::response::ComparisonResponse;
use crate::api::http_server::{ApiErrorResponse, AppState};

/// POST /v1/compare - Ask the same question of several documents
///
/// Runs the query pipeline against each document individually, then asks
/// the LLM to summarize agreements and differences across the answers.
///
/// # Errors
/// - 400 Bad Request: validation failure (fewer than 2 or more than 10 docs)
/// - 502 Bad Gateway: embedding or LLM backend failed
/// - 500 Internal Server Error: storage failure
pub async fn compare_handler(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<ComparisonResponse>, ApiErrorResponse> {
    debug!(
        "Compare request received for session {} over {} documents",
        request.session_id,
        request.doc_ids.len()
    );

    if let Err(e) = request.validate() {
        warn!("Compare validation failed: {}", e);
        return Err(ApiErrorResponse(e));
    }

    let doc_ids = request.doc_ids_trimmed();
    let outcome = state
        .context
        .query
        .compare_documents(
            request.question_trimmed(),
            &doc_ids,
            &request.session_id,
            request.llm_provider.as_deref(),
        )
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(Json(outcome.into()))
}
