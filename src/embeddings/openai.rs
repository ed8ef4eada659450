// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI embedding provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{EmbeddingError, EmbeddingProvider};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiEmbeddings {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(api_key: &str, model: &str) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| EmbeddingError::Request {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })?;

        // text-embedding-3-small is 1536-dimensional, 3-large is 3072
        let dimension = if model.contains("3-small") { 1536 } else { 3072 };
        info!("OpenAI embeddings configured: model={}", model);

        Ok(Self {
            client,
            api_base: OPENAI_API_BASE.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimension,
        })
    }

    /// Point the client at an OpenAI-compatible endpoint
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn request_embeddings(
        &self,
        input: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embeddings", self.api_base);
        let body = serde_json::json!({
            "model": self.model,
            "input": input,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Request {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                provider: "openai".to_string(),
                status,
                message,
            });
        }

        let parsed: OpenAiEmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::MalformedResponse {
                    provider: "openai".to_string(),
                    reason: e.to_string(),
                })?;

        if parsed.data.len() != input.len() {
            return Err(EmbeddingError::MalformedResponse {
                provider: "openai".to_string(),
                reason: format!(
                    "expected {} embeddings, got {}",
                    input.len(),
                    parsed.data.len()
                ),
            });
        }

        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!("embedding {} texts with openai model {}", texts.len(), self.model);
        // The API accepts the whole batch in one request
        self.request_embeddings(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.request_embeddings(&[text.to_string()]).await?;
        embeddings.pop().ok_or_else(|| EmbeddingError::MalformedResponse {
            provider: "openai".to_string(),
            reason: "empty embedding response".to_string(),
        })
    }
}
