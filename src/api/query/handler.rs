// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, warn};

use super::request::QueryRequest;
use super::response::QueryResponse;
use crate::api::http_server::{ApiErrorResponse, AppState};

/// POST /v1/query - Answer a question from session documents
///
/// Embeds the question, retrieves the best chunks across the requested
/// documents and asks the configured LLM for an answer grounded in them.
///
/// # Errors
/// - 400 Bad Request: validation failure or unknown provider
/// - 502 Bad Gateway: embedding or LLM backend failed
/// - 500 Internal Server Error: storage failure
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiErrorResponse> {
    debug!(
        "Query request received for session {}",
        request.session_id
    );

    if let Err(e) = request.validate(state.context.config.retrieval.max_top_k) {
        warn!("Query validation failed: {}", e);
        return Err(ApiErrorResponse(e));
    }

    let top_k = request
        .top_k
        .unwrap_or(state.context.config.retrieval.default_top_k);

    let outcome = state
        .context
        .query
        .query_documents(
            request.question_trimmed(),
            &request.session_id,
            request.doc_ids.as_deref(),
            request.llm_provider.as_deref(),
            top_k,
            request.include_sources,
        )
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(Json(outcome.into()))
}
