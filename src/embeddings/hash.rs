// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic hash-based embeddings
//!
//! Expands a SHA-256 digest of the text into a pseudo-random vector with
//! a linear congruential generator, then L2-normalizes it. The vectors
//! carry no semantic meaning; the provider exists so ingestion and
//! retrieval can run offline and in tests with stable, reproducible
//! results. Identical text always maps to an identical vector, across
//! processes and builds.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{EmbeddingError, EmbeddingProvider};

pub struct HashEmbeddings {
    dimension: usize,
}

impl HashEmbeddings {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        let mut seed = u64::from_le_bytes(seed_bytes);

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223) ^ (i as u64);
            let value = (seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_text(text))
    }
}
