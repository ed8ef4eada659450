// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration loaded from environment variables

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::rag::ChunkStrategy;

pub const APP_NAME: &str = "PDF-to-Agent";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub documents: DocumentConfig,
    pub providers: ProviderConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub strategy: ChunkStrategy,
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Character overlap between consecutive fixed-size chunks
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Candidates taken from each document before the global merge
    pub top_k_per_document: usize,
    /// Results returned when a query does not ask for a specific count
    pub default_top_k: usize,
    /// Upper bound a query may request
    pub max_top_k: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub max_file_size_mb: usize,
}

impl DocumentConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub default_embedding_provider: String,
    pub default_llm_provider: String,
    /// OpenAI providers are only registered when a key is present
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_embedding_model: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u32,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub ollama_embedding_model: String,
    pub ollama_temperature: f32,
    pub ollama_num_ctx: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub storage_dir: PathBuf,
    /// Serialized per-document indexes
    pub vector_store_dir: PathBuf,
    /// Original uploaded files
    pub documents_dir: PathBuf,
    /// Per-document JSON records
    pub metadata_dir: PathBuf,
}

impl StorageConfig {
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            &self.storage_dir,
            &self.vector_store_dir,
            &self.documents_dir,
            &self.metadata_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let storage_dir = PathBuf::from(
            env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string()),
        );
        let sub_dir = |key: &str, name: &str| {
            env::var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|_| storage_dir.join(name))
        };

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8000),
            },
            chunking: ChunkingConfig {
                strategy: env::var("CHUNKING_STRATEGY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(ChunkStrategy::Recursive),
                chunk_size: env::var("CHUNK_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
                chunk_overlap: env::var("CHUNK_OVERLAP")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(200),
            },
            retrieval: RetrievalConfig {
                top_k_per_document: env::var("TOP_K_PER_DOCUMENT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                default_top_k: env::var("DEFAULT_TOP_K")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                max_top_k: env::var("MAX_TOP_K")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
            },
            documents: DocumentConfig {
                max_file_size_mb: env::var("MAX_FILE_SIZE_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50),
            },
            providers: ProviderConfig {
                default_embedding_provider: env::var("DEFAULT_EMBEDDING_PROVIDER")
                    .unwrap_or_else(|_| "ollama".to_string()),
                default_llm_provider: env::var("DEFAULT_LLM_PROVIDER")
                    .unwrap_or_else(|_| "ollama".to_string()),
                openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
                openai_model: env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                openai_embedding_model: env::var("OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                openai_temperature: env::var("OPENAI_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.3),
                openai_max_tokens: env::var("OPENAI_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
                ollama_base_url: env::var("OLLAMA_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                ollama_model: env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| "llama3.2:3b".to_string()),
                ollama_embedding_model: env::var("OLLAMA_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "nomic-embed-text".to_string()),
                ollama_temperature: env::var("OLLAMA_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.3),
                ollama_num_ctx: env::var("OLLAMA_NUM_CTX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(4096),
            },
            storage: StorageConfig {
                vector_store_dir: sub_dir("VECTOR_STORE_DIR", "vector_store"),
                documents_dir: sub_dir("DOCUMENTS_DIR", "documents"),
                metadata_dir: sub_dir("METADATA_DIR", "metadata"),
                storage_dir,
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunking.chunk_size == 0 {
            return Err("Chunk size must be greater than 0".to_string());
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(format!(
                "Chunk overlap ({}) must be less than chunk size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            ));
        }
        if self.retrieval.top_k_per_document == 0 {
            return Err("top_k_per_document must be greater than 0".to_string());
        }
        if self.retrieval.default_top_k == 0
            || self.retrieval.default_top_k > self.retrieval.max_top_k
        {
            return Err(format!(
                "default_top_k ({}) must be between 1 and max_top_k ({})",
                self.retrieval.default_top_k, self.retrieval.max_top_k
            ));
        }
        if self.documents.max_file_size_mb == 0 {
            return Err("Max file size must be greater than 0".to_string());
        }
        if self.providers.default_llm_provider == "openai"
            && self.providers.openai_api_key.is_none()
        {
            return Err(
                "OPENAI_API_KEY is required when the default LLM provider is openai".to_string(),
            );
        }
        if self.providers.default_embedding_provider == "openai"
            && self.providers.openai_api_key.is_none()
        {
            return Err(
                "OPENAI_API_KEY is required when the default embedding provider is openai"
                    .to_string(),
            );
        }
        if let Err(e) = Url::parse(&self.providers.ollama_base_url) {
            return Err(format!(
                "OLLAMA_BASE_URL '{}' is not a valid URL: {}",
                self.providers.ollama_base_url, e
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let storage_dir = PathBuf::from("./storage");
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            chunking: ChunkingConfig {
                strategy: ChunkStrategy::Recursive,
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            retrieval: RetrievalConfig {
                top_k_per_document: 3,
                default_top_k: 5,
                max_top_k: 20,
            },
            documents: DocumentConfig {
                max_file_size_mb: 50,
            },
            providers: ProviderConfig {
                default_embedding_provider: "ollama".to_string(),
                default_llm_provider: "ollama".to_string(),
                openai_api_key: None,
                openai_model: "gpt-4o-mini".to_string(),
                openai_embedding_model: "text-embedding-3-small".to_string(),
                openai_temperature: 0.3,
                openai_max_tokens: 2000,
                ollama_base_url: "http://localhost:11434".to_string(),
                ollama_model: "llama3.2:3b".to_string(),
                ollama_embedding_model: "nomic-embed-text".to_string(),
                ollama_temperature: 0.3,
                ollama_num_ctx: 4096,
            },
            storage: StorageConfig {
                vector_store_dir: storage_dir.join("vector_store"),
                documents_dir: storage_dir.join("documents"),
                metadata_dir: storage_dir.join("metadata"),
                storage_dir,
            },
        }
    }
}
