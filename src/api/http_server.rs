// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use super::compare::compare_handler;
use super::documents::{delete_document_handler, list_documents_handler};
use super::query::query_handler;
use super::upload::upload_handler;
use super::ApiError;
use crate::config::{APP_NAME, VERSION};
use crate::context::AppContext;

/// Extra room on top of the file-size limit for multipart framing and
/// the other form fields
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub context: AppContext,
}

pub async fn start_server(context: AppContext) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!(
        "{}:{}",
        context.config.server.host, context.config.server.port
    )
    .parse()?;
    let app = router(context);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router; separated from [`start_server`] so tests
/// can drive it without binding a socket
pub fn router(context: AppContext) -> Router {
    let body_limit = context.config.documents.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    let state = AppState { context };

    Router::new()
        // App info and health
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Document lifecycle
        .route("/v1/documents", post(upload_handler))
        .route(
            "/v1/documents/:id",
            get(list_documents_handler).delete(delete_document_handler),
        )
        // Question answering
        .route("/v1/query", post(query_handler))
        .route("/v1/compare", post(compare_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    timestamp: DateTime<Utc>,
    embedding_providers: Vec<String>,
    llm_providers: Vec<String>,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::response::Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        timestamp: Utc::now(),
        embedding_providers: state.context.embeddings.names(),
        llm_providers: state.context.llms.names(),
    })
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Json(json!({
        "app": APP_NAME,
        "version": VERSION,
        "status": "running",
        "endpoints": {
            "upload": "/v1/documents",
            "documents": "/v1/documents/{session_id}",
            "query": "/v1/query",
            "compare": "/v1/compare",
            "health": "/health",
        }
    }))
}

// Error response wrapper
pub struct ApiErrorResponse(pub ApiError);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response(None);

        (status, axum::response::Json(error_response)).into_response()
    }
}
