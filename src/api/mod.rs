// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod compare;
pub mod documents;
pub mod errors;
pub mod http_server;
pub mod query;
pub mod upload;

pub use compare::{compare_handler, ComparisonRequest, ComparisonResponse};
pub use documents::{
    delete_document_handler, list_documents_handler, DeleteResponse, DocumentListResponse,
    DocumentSummary,
};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{router, start_server, AppState};
pub use query::{query_handler, QueryRequest, QueryResponse};
pub use upload::{upload_handler, UploadResponse};
