// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Compare API module
//!
//! POST /v1/compare answers one question per document and returns a
//! comparative summary alongside the per-document answers.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::compare_handler;
pub use request::ComparisonRequest;
pub use response::ComparisonResponse;
