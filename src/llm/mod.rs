// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! LLM providers for answer generation
//!
//! Same registry pattern as the embedding providers: requests may name a
//! provider, otherwise the configured default answers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod ollama;
pub mod openai;

pub use ollama::OllamaLlm;
pub use openai::OpenAiLlm;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider '{0}' is not configured")]
    UnknownProvider(String),

    #[error("LLM request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} LLM API returned {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`, optionally steered by a
    /// system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError>;
}

pub struct LlmRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default_name: String,
}

impl LlmRegistry {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_name: default_name.into(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| LlmError::UnknownProvider(name.to_string()))
    }

    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn LlmProvider>, LlmError> {
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
