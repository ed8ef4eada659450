// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Document management API module
//!
//! GET /v1/documents/{session_id} lists a session's documents and
//! DELETE /v1/documents/{doc_id} removes one, with session authorization.

pub mod handler;
pub mod response;

pub use handler::{delete_document_handler, list_documents_handler};
pub use response::{DeleteResponse, DocumentListResponse, DocumentSummary};
