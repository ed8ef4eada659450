// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use pdf_agent_node::{
    api,
    config::{Config, APP_NAME, VERSION},
    AppContext,
};
use std::env;

/// Multi-document question answering over uploaded PDFs
#[derive(Parser, Debug)]
#[command(name = "pdf-agent-node", version = VERSION)]
struct Args {
    /// Bind address for the HTTP API (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP API (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("🚀 Starting {} v{}...\n", APP_NAME, VERSION);

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    println!("📄 Chunking: {:?} (size {}, overlap {})",
        config.chunking.strategy, config.chunking.chunk_size, config.chunking.chunk_overlap);
    println!("🗄️  Storage: {}", config.storage.storage_dir.display());
    println!(
        "🤖 Providers: embeddings={}, llm={}\n",
        config.providers.default_embedding_provider, config.providers.default_llm_provider
    );

    let context = AppContext::build(config)?;

    api::start_server(context)
        .await
        .map_err(|e| anyhow!("API server failed: {}", e))?;

    Ok(())
}
