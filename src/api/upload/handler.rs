// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload endpoint handler

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Multipart;
use tracing::{info, warn};
use uuid::Uuid;

use super::response::UploadResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::{ApiErrorResponse, AppState};

/// POST /v1/documents - Upload and index a document
///
/// Multipart form fields:
/// - `file` (required): the document, `.pdf`, `.txt` or `.md`
/// - `session_id` (optional): session to attach the document to; a fresh
///   UUID is generated when absent and returned in the response
/// - `embedding_provider` (optional): provider name for this document
///
/// # Errors
/// - 400 Bad Request: missing file, unsupported type, oversized upload,
///   unknown provider
/// - 502 Bad Gateway: embedding backend failed
/// - 500 Internal Server Error: storage failure
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiErrorResponse> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut session_id: Option<String> = None;
    let mut embedding_provider: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_multipart(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string).ok_or_else(|| {
                    ApiErrorResponse(ApiError::ValidationError {
                        field: "file".to_string(),
                        message: "file field must carry a filename".to_string(),
                    })
                })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_multipart(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            Some("session_id") => {
                session_id = Some(field.text().await.map_err(|e| bad_multipart(e.to_string()))?);
            }
            Some("embedding_provider") => {
                embedding_provider =
                    Some(field.text().await.map_err(|e| bad_multipart(e.to_string()))?);
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        warn!("Upload rejected: no file field");
        ApiErrorResponse(ApiError::ValidationError {
            field: "file".to_string(),
            message: "file field is required".to_string(),
        })
    })?;

    let session_id = session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let embedding_provider = embedding_provider.filter(|p| !p.trim().is_empty());

    info!(
        "Upload received: {} ({} bytes) for session {}",
        filename,
        data.len(),
        session_id
    );

    let record = state
        .context
        .documents
        .upload(data, &filename, &session_id, embedding_provider.as_deref())
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(Json(record.into()))
}

fn bad_multipart(reason: String) -> ApiErrorResponse {
    ApiErrorResponse(ApiError::InvalidRequest(format!(
        "malformed multipart body: {}",
        reason
    )))
}
