// End-to-end retrieval pipeline: chunk text, embed it with the
// deterministic hash provider, index per document and search across
// documents through the public API.

use std::collections::HashMap;
use std::sync::Arc;

use pdf_agent_node::embeddings::{EmbeddingProvider, HashEmbeddings};
use pdf_agent_node::rag::{chunk, ChunkStrategy, IndexStore, RetrievalEngine};
use pdf_agent_node::storage::MemoryStorage;

const DIMENSION: usize = 32;

// Three paragraphs, each short enough to become its own semantic chunk
// at chunk_size 30.
const CRAB_DOC: &str =
    "Crabs are crustaceans.\n\nFerris the crab is a mascot.\n\nOceans hold many species.";
const TRAIN_DOC: &str =
    "Steam engines came first.\n\nDiesel replaced steam.\n\nElectric trains are quiet.";

async fn index_document(store: &IndexStore, provider: &HashEmbeddings, doc_id: &str, text: &str) {
    let chunks = chunk(text, doc_id, ChunkStrategy::Semantic, 30, 0, None).unwrap();
    assert_eq!(chunks.len(), 3, "fixture should split into one chunk per paragraph");

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_documents(&texts).await.unwrap();

    let mut metadata = HashMap::new();
    metadata.insert("filename".to_string(), format!("{}.txt", doc_id));
    store.put(doc_id, chunks, vectors, metadata).await.unwrap();
}

async fn two_document_engine() -> (Arc<IndexStore>, RetrievalEngine, HashEmbeddings) {
    let store = Arc::new(IndexStore::new(Arc::new(MemoryStorage::new())));
    let provider = HashEmbeddings::new(DIMENSION);

    index_document(&store, &provider, "doc-crabs", CRAB_DOC).await;
    index_document(&store, &provider, "doc-trains", TRAIN_DOC).await;

    let engine = RetrievalEngine::new(store.clone());
    (store, engine, provider)
}

fn both_ids() -> Vec<String> {
    vec!["doc-crabs".to_string(), "doc-trains".to_string()]
}

#[tokio::test]
async fn test_exact_chunk_text_is_the_top_hit() {
    let (_, engine, provider) = two_document_engine().await;

    // Hash embeddings are deterministic, so embedding a chunk's exact text
    // reproduces its stored vector and lands at distance zero.
    let query = provider
        .embed_query("Ferris the crab is a mascot.")
        .await
        .unwrap();
    let results = engine.search_multi(&both_ids(), &query, 3, 6).await.unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].doc_id, "doc-crabs");
    assert_eq!(results[0].text, "Ferris the crab is a mascot.");
    assert!(results[0].score > 0.999, "identical text should score ~1.0");
}

#[tokio::test]
async fn test_max_total_caps_the_merged_result_list() {
    let (_, engine, provider) = two_document_engine().await;

    let query = provider.embed_query("steam").await.unwrap();
    let results = engine.search_multi(&both_ids(), &query, 3, 4).await.unwrap();

    // Three candidates per document, four survive the global cut
    assert_eq!(results.len(), 4);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_page_numbers_flow_through_to_results() {
    let store = Arc::new(IndexStore::new(Arc::new(MemoryStorage::new())));
    let provider = HashEmbeddings::new(DIMENSION);

    let chunks = chunk(CRAB_DOC, "doc-pages", ChunkStrategy::Semantic, 30, 0, Some(&[1, 1, 2]))
        .unwrap();
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_documents(&texts).await.unwrap();
    store
        .put("doc-pages", chunks, vectors, HashMap::new())
        .await
        .unwrap();

    let engine = RetrievalEngine::new(store);
    let query = provider.embed_query("Oceans hold many species.").await.unwrap();
    let results = engine
        .search_multi(&["doc-pages".to_string()], &query, 3, 3)
        .await
        .unwrap();

    assert_eq!(results[0].text, "Oceans hold many species.");
    assert_eq!(results[0].page_num, Some(2));
    assert_eq!(results[0].extra["chunk_index"], serde_json::json!(2));
}

#[tokio::test]
async fn test_deleted_document_drops_out_of_search() {
    let (store, engine, provider) = two_document_engine().await;

    assert!(store.delete("doc-crabs").await.unwrap());

    let query = provider
        .embed_query("Ferris the crab is a mascot.")
        .await
        .unwrap();
    let results = engine.search_multi(&both_ids(), &query, 3, 6).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.doc_id == "doc-trains"));
}

#[tokio::test]
async fn test_fixed_strategy_chunks_are_retrievable() {
    let store = Arc::new(IndexStore::new(Arc::new(MemoryStorage::new())));
    let provider = HashEmbeddings::new(DIMENSION);

    let text = "abcdefghij klmnopqrst uvwxyz0123 456789ABCD EFGHIJKLMN";
    let chunks = chunk(text, "doc-fixed", ChunkStrategy::Fixed, 20, 5, None).unwrap();
    let target = chunks[1].text.clone();

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_documents(&texts).await.unwrap();
    store
        .put("doc-fixed", chunks, vectors, HashMap::new())
        .await
        .unwrap();

    let engine = RetrievalEngine::new(store);
    let query = provider.embed_query(&target).await.unwrap();
    let results = engine
        .search_multi(&["doc-fixed".to_string()], &query, 1, 1)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk_id, "doc-fixed_chunk_1");
    assert_eq!(results[0].text, target);
}
