// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod context;
pub mod documents;
pub mod embeddings;
pub mod extract;
pub mod llm;
pub mod query_service;
pub mod rag;
pub mod storage;

// Re-export the main types
pub use config::Config;
pub use context::AppContext;
pub use documents::{DocumentRecord, DocumentService, MetadataStore};
pub use embeddings::{EmbeddingProvider, EmbeddingRegistry};
pub use extract::{extract, ExtractedDocument};
pub use llm::{LlmProvider, LlmRegistry};
pub use query_service::{ComparisonOutcome, QueryOutcome, QueryService};
pub use rag::{chunk, Chunk, ChunkStrategy, DocumentIndex, IndexStore, RetrievalEngine, SearchResult};
pub use storage::{FsStorage, IndexStorage, MemoryStorage};
