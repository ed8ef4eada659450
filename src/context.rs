// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application wiring
//!
//! Builds every long-lived component from configuration and hands the API
//! layer one shared bundle. Provider registries are populated here so a
//! misconfigured default (for example an OpenAI default with no API key)
//! fails at startup instead of on the first request.

use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use tracing::info;

use crate::config::Config;
use crate::documents::{DocumentService, MetadataStore};
use crate::embeddings::{
    EmbeddingRegistry, HashEmbeddings, OllamaEmbeddings, OpenAiEmbeddings,
};
use crate::llm::{LlmRegistry, OllamaLlm, OpenAiLlm};
use crate::query_service::QueryService;
use crate::rag::{IndexStore, RetrievalEngine};
use crate::storage::FsStorage;

/// Dimension of the deterministic offline embedding provider
const HASH_EMBEDDING_DIMENSION: usize = 384;

/// Shared application components, cloned into request handlers
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub documents: Arc<DocumentService>,
    pub query: Arc<QueryService>,
    pub embeddings: Arc<EmbeddingRegistry>,
    pub llms: Arc<LlmRegistry>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn build(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|reason| anyhow!("invalid configuration: {}", reason))?;
        config
            .storage
            .ensure_directories()
            .context("failed to create storage directories")?;

        let config = Arc::new(config);

        let storage = Arc::new(FsStorage::new(config.storage.vector_store_dir.clone()));
        let index_store = Arc::new(IndexStore::new(storage));
        let retrieval = Arc::new(RetrievalEngine::new(index_store.clone()));
        let metadata = Arc::new(MetadataStore::new(config.storage.metadata_dir.clone()));

        let embeddings = Arc::new(build_embedding_registry(&config)?);
        let llms = Arc::new(build_llm_registry(&config)?);

        let documents = Arc::new(DocumentService::new(
            config.clone(),
            index_store,
            metadata,
            embeddings.clone(),
        ));
        let query = Arc::new(QueryService::new(
            config.clone(),
            retrieval,
            documents.clone(),
            embeddings.clone(),
            llms.clone(),
        ));

        info!(
            "Application context ready: embedding providers {:?} (default {}), llm providers {:?} (default {})",
            embeddings.names(),
            embeddings.default_name(),
            llms.names(),
            llms.default_name()
        );

        Ok(Self {
            config,
            documents,
            query,
            embeddings,
            llms,
        })
    }
}

fn build_embedding_registry(config: &Config) -> Result<EmbeddingRegistry> {
    let providers = &config.providers;
    let mut registry = EmbeddingRegistry::new(providers.default_embedding_provider.clone());

    registry.register(Arc::new(OllamaEmbeddings::new(
        &providers.ollama_base_url,
        &providers.ollama_embedding_model,
    )?));
    if let Some(api_key) = &providers.openai_api_key {
        registry.register(Arc::new(OpenAiEmbeddings::new(
            api_key,
            &providers.openai_embedding_model,
        )?));
    }
    // Deterministic local provider for offline and test use
    registry.register(Arc::new(HashEmbeddings::new(HASH_EMBEDDING_DIMENSION)));

    if registry.get(registry.default_name()).is_err() {
        return Err(anyhow!(
            "default embedding provider '{}' is not configured (available: {:?})",
            registry.default_name(),
            registry.names()
        ));
    }
    Ok(registry)
}

fn build_llm_registry(config: &Config) -> Result<LlmRegistry> {
    let providers = &config.providers;
    let mut registry = LlmRegistry::new(providers.default_llm_provider.clone());

    registry.register(Arc::new(OllamaLlm::new(
        &providers.ollama_base_url,
        &providers.ollama_model,
        providers.ollama_temperature,
        providers.ollama_num_ctx,
    )?));
    if let Some(api_key) = &providers.openai_api_key {
        registry.register(Arc::new(OpenAiLlm::new(
            api_key,
            &providers.openai_model,
            providers.openai_temperature,
            providers.openai_max_tokens,
        )?));
    }

    if registry.get(registry.default_name()).is_err() {
        return Err(anyhow!(
            "default llm provider '{}' is not configured (available: {:?})",
            registry.default_name(),
            registry.names()
        ));
    }
    Ok(registry)
}
