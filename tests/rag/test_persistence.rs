// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Durability of document indexes across a simulated process restart: a
// fresh IndexStore over the same directory must serve identical data.

use std::collections::HashMap;
use std::sync::Arc;

use pdf_agent_node::embeddings::{EmbeddingProvider, HashEmbeddings};
use pdf_agent_node::rag::{chunk, Chunk, ChunkStrategy, IndexStore, RagError, RetrievalEngine};
use pdf_agent_node::storage::FsStorage;

const TEXT: &str = "Alpha paragraph about storage.\n\nBeta paragraph about retrieval.";

async fn fixture(provider: &HashEmbeddings) -> (Vec<Chunk>, Vec<Vec<f32>>) {
    let chunks = chunk(TEXT, "doc-1", ChunkStrategy::Semantic, 35, 0, None).unwrap();
    assert_eq!(chunks.len(), 2);
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_documents(&texts).await.unwrap();
    (chunks, vectors)
}

fn store_at(dir: &std::path::Path) -> IndexStore {
    IndexStore::new(Arc::new(FsStorage::new(dir)))
}

#[tokio::test]
async fn test_index_survives_store_restart() {
    let dir = tempfile::tempdir().unwrap();
    let provider = HashEmbeddings::new(24);
    let (chunks, vectors) = fixture(&provider).await;

    {
        let store = store_at(dir.path());
        let mut metadata = HashMap::new();
        metadata.insert("filename".to_string(), "notes.txt".to_string());
        store
            .put("doc-1", chunks.clone(), vectors.clone(), metadata)
            .await
            .unwrap();
    }

    // Fresh store over the same directory: nothing cached, load from disk
    let store = store_at(dir.path());
    assert_eq!(store.size(), 0);

    let index = store.get("doc-1").await.unwrap();
    assert_eq!(index.doc_id(), "doc-1");
    assert_eq!(index.chunks(), chunks.as_slice());
    assert_eq!(index.extra_metadata()["filename"], "notes.txt");

    // Vectors come back bit-for-bit, not approximately
    for (original, restored) in vectors.iter().zip(index.vectors()) {
        for (a, b) in original.iter().zip(restored) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}

#[tokio::test]
async fn test_search_results_identical_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let provider = HashEmbeddings::new(24);
    let (chunks, vectors) = fixture(&provider).await;
    let query = provider
        .embed_query("Beta paragraph about retrieval.")
        .await
        .unwrap();

    let before = {
        let store = Arc::new(store_at(dir.path()));
        store
            .put("doc-1", chunks, vectors, HashMap::new())
            .await
            .unwrap();
        RetrievalEngine::new(store)
            .search_multi(&["doc-1".to_string()], &query, 2, 2)
            .await
            .unwrap()
    };

    let after = RetrievalEngine::new(Arc::new(store_at(dir.path())))
        .search_multi(&["doc-1".to_string()], &query, 2, 2)
        .await
        .unwrap();

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.chunk_id, a.chunk_id);
        assert_eq!(b.score.to_bits(), a.score.to_bits());
    }
    assert_eq!(after[0].text, "Beta paragraph about retrieval.");
}

#[tokio::test]
async fn test_delete_is_durable() {
    let dir = tempfile::tempdir().unwrap();
    let provider = HashEmbeddings::new(24);
    let (chunks, vectors) = fixture(&provider).await;

    {
        let store = store_at(dir.path());
        store
            .put("doc-1", chunks, vectors, HashMap::new())
            .await
            .unwrap();
        assert!(store.delete("doc-1").await.unwrap());
    }

    let store = store_at(dir.path());
    assert!(!store.exists("doc-1").await.unwrap());
    assert!(matches!(
        store.get("doc-1").await,
        Err(RagError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_blob_file_layout_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let provider = HashEmbeddings::new(24);
    let (chunks, vectors) = fixture(&provider).await;

    let store = store_at(dir.path());
    store
        .put("doc-1", chunks, vectors, HashMap::new())
        .await
        .unwrap();

    let blob = dir.path().join("doc-1.idx");
    assert!(blob.is_file());
    // No temp files left behind after the atomic rename
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    store.delete("doc-1").await.unwrap();
    assert!(!blob.exists());
}
