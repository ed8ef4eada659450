// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// RAG (Retrieval-Augmented Generation) module
// Document chunking, per-document vector indexes, and multi-document retrieval

pub mod chunker;
pub mod document_index;
pub mod errors;
pub mod index_store;
pub mod retrieval;

pub use chunker::{chunk, Chunk, ChunkStrategy};
pub use document_index::{similarity_score, DocumentIndex};
pub use errors::RagError;
pub use index_store::IndexStore;
pub use retrieval::{RetrievalEngine, SearchResult};
