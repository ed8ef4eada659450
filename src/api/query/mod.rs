// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Query API module
//!
//! POST /v1/query answers a natural-language question from the chunks
//! retrieved across a session's documents.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::query_handler;
pub use request::QueryRequest;
pub use response::QueryResponse;
