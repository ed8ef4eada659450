// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ollama embedding provider for local/private deployment

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{EmbeddingError, EmbeddingProvider};

/// Output dimension of nomic-embed-text
const NOMIC_EMBED_DIMENSION: usize = 768;

pub struct OllamaEmbeddings {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddings {
    pub fn new(base_url: &str, model: &str) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| EmbeddingError::Request {
                provider: "ollama".to_string(),
                reason: e.to_string(),
            })?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "Ollama embeddings configured: endpoint={}, model={}",
            base_url, model
        );

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
            dimension: NOMIC_EMBED_DIMENSION,
        })
    }

    /// Check whether the Ollama server answers at all
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Ollama health check failed: {}", e);
                false
            }
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Request {
                provider: "ollama".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                provider: "ollama".to_string(),
                status,
                message,
            });
        }

        let parsed: OllamaEmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::MalformedResponse {
                    provider: "ollama".to_string(),
                    reason: e.to_string(),
                })?;
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn name(&self) -> &str {
        "ollama"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    // The embeddings endpoint takes one prompt per call, so documents are
    // embedded sequentially.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!("embedding {} texts with ollama model {}", texts.len(), self.model);
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_one(text).await?);
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_one(text).await
    }
}
