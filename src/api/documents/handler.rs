// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document listing and deletion handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use super::response::{DeleteResponse, DocumentListResponse, DocumentSummary};
use crate::api::errors::ApiError;
use crate::api::http_server::{ApiErrorResponse, AppState};

/// GET /v1/documents/{session_id} - List a session's documents
///
/// Returns documents newest-first. An unknown session yields an empty
/// list, not an error.
pub async fn list_documents_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DocumentListResponse>, ApiErrorResponse> {
    debug!("Listing documents for session {}", session_id);

    let records = state
        .context
        .documents
        .list_by_session(&session_id)
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    let documents: Vec<DocumentSummary> = records.into_iter().map(Into::into).collect();
    let total_count = documents.len();

    Ok(Json(DocumentListResponse {
        session_id,
        documents,
        total_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub session_id: String,
}

/// DELETE /v1/documents/{doc_id}?session_id= - Delete a document
///
/// Responds 404 both for unknown documents and for documents owned by a
/// different session, so existence is not leaked across sessions.
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let deleted = state
        .context
        .documents
        .delete(&doc_id, &params.session_id)
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    if !deleted {
        return Err(ApiErrorResponse(ApiError::NotFound(
            "Document not found or not authorized".to_string(),
        )));
    }

    info!("Document {} deleted via API", doc_id);
    Ok(Json(DeleteResponse {
        message: "Document deleted successfully".to_string(),
        doc_id,
    }))
}
