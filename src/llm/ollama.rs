// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ollama LLM provider for local deployment

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{LlmError, LlmProvider};

pub struct OllamaLlm {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaLlm {
    pub fn new(
        base_url: &str,
        model: &str,
        temperature: f32,
        num_ctx: u32,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::Request {
                provider: "ollama".to_string(),
                reason: e.to_string(),
            })?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!("Ollama LLM configured: endpoint={}, model={}", base_url, model);

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
            temperature,
            num_ctx,
        })
    }

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
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        // The generate endpoint takes one flat prompt, so the system
        // prompt is prepended rather than sent as a separate role.
        let full_prompt = match system_prompt {
            Some(system) => format!("{}\n\n{}", system, prompt),
            None => prompt.to_string(),
        };

        let body = serde_json::json!({
            "model": self.model,
            "prompt": full_prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_ctx": self.num_ctx,
            },
        });

        let url = format!("{}/api/generate", self.base_url);
        debug!("Ollama generate POST {} ({} prompt chars)", url, full_prompt.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                provider: "ollama".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: "ollama".to_string(),
                status,
                message,
            });
        }

        let parsed: OllamaGenerateResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::MalformedResponse {
                    provider: "ollama".to_string(),
                    reason: e.to_string(),
                })?;
        Ok(parsed.response)
    }
}
