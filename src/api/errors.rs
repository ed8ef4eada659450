// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::documents::{DocumentError, MetadataError};
use crate::embeddings::EmbeddingError;
use crate::extract::ExtractError;
use crate::llm::LlmError;
use crate::query_service::QueryError;
use crate::rag::RagError;

/// Error payload returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    UnknownProvider { provider: String },
    /// An upstream embedding or LLM backend failed or is unreachable
    ProviderUnavailable(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::UnknownProvider { provider } => {
                let mut details = HashMap::new();
                details.insert(
                    "provider".to_string(),
                    serde_json::Value::String(provider.clone()),
                );
                (
                    "unknown_provider",
                    format!("Provider '{}' is not configured", provider),
                    Some(details),
                )
            }
            ApiError::ProviderUnavailable(msg) => ("provider_unavailable", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_)
            | ApiError::ValidationError { .. }
            | ApiError::UnknownProvider { .. } => 400,
            ApiError::ProviderUnavailable(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UnknownProvider { provider } => {
                write!(f, "Provider '{}' is not configured", provider)
            }
            ApiError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::UnknownProvider(provider) => ApiError::UnknownProvider { provider },
            other => ApiError::ProviderUnavailable(other.to_string()),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::UnknownProvider(provider) => ApiError::UnknownProvider { provider },
            other => ApiError::ProviderUnavailable(other.to_string()),
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RagError::InvalidQuery { .. }
            | RagError::DimensionMismatch { .. }
            | RagError::InconsistentDimension { .. }
            | RagError::InvalidVector { .. }
            | RagError::EmptyDocument { .. } => ApiError::InvalidRequest(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Io(e) => ApiError::InternalError(e.to_string()),
            // Everything else is a problem with the uploaded file
            other => ApiError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::FileTooLarge { .. } => ApiError::InvalidRequest(err.to_string()),
            DocumentError::Extract(e) => e.into(),
            DocumentError::Embedding(e) => e.into(),
            DocumentError::Rag(e) => e.into(),
            DocumentError::Metadata(e) => e.into(),
            DocumentError::FileStore(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Embedding(e) => e.into(),
            QueryError::Llm(e) => e.into(),
            QueryError::Rag(e) => e.into(),
            QueryError::Document(e) => e.into(),
        }
    }
}
