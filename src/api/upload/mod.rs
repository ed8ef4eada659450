// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload API module
//!
//! POST /v1/documents ingests a multipart file upload: extraction,
//! chunking, embedding and indexing in one request.

pub mod handler;
pub mod response;

pub use handler::upload_handler;
pub use response::UploadResponse;
