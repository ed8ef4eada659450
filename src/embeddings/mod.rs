// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding providers
//!
//! Documents must be queried with the same provider that embedded them,
//! so providers are looked up by name through a registry instead of being
//! hardwired. The registry is populated once at startup from the
//! configuration; an unconfigured name is an error, not a fallback.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod hash;
pub mod ollama;
pub mod openai;

pub use hash::HashEmbeddings;
pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider '{0}' is not configured")]
    UnknownProvider(String),

    #[error("Embedding request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} embedding API returned {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },
}

/// A service that turns text into fixed-dimension vectors
///
/// `embed_documents` is order-preserving: one vector per input text, all
/// of `dimension()` length. Failures are fatal to the calling operation;
/// retry policy belongs to the caller.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl std::fmt::Debug for dyn EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("name", &self.name())
            .finish()
    }
}

/// Named embedding providers, with one designated default
pub struct EmbeddingRegistry {
    providers: HashMap<String, Arc<dyn EmbeddingProvider>>,
    default_name: String,
}

impl EmbeddingRegistry {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_name: default_name.into(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn EmbeddingProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| EmbeddingError::UnknownProvider(name.to_string()))
    }

    /// Look up by name, falling back to the configured default
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
        self.get(name.unwrap_or(&self.default_name))
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}
