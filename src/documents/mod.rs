// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Document lifecycle: ownership records and the upload/delete pipeline

pub mod record;
pub mod service;

pub use record::{DocumentRecord, MetadataError, MetadataStore};
pub use service::{DocumentError, DocumentService};
