// Upload through the document service, then find the same content
// through the retrieval engine sharing the index store.

use std::sync::Arc;

use pdf_agent_node::config::Config;
use pdf_agent_node::documents::{DocumentService, MetadataStore};
use pdf_agent_node::embeddings::{EmbeddingProvider, EmbeddingRegistry, HashEmbeddings};
use pdf_agent_node::rag::{ChunkStrategy, IndexStore, RetrievalEngine};
use pdf_agent_node::storage::FsStorage;

const DIMENSION: usize = 24;

const RUST_NOTES: &str =
    "Rust ships a borrow checker.\n\nCrabs live in oceans worldwide.\n\nCompilers can be friendly.";
const BAKING_NOTES: &str =
    "Sourdough needs a starter.\n\nKnead the dough ten minutes.\n\nBake at high heat.";

struct Stack {
    service: DocumentService,
    engine: RetrievalEngine,
    provider: HashEmbeddings,
    _dir: tempfile::TempDir,
}

fn stack() -> Stack {
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.storage_dir = dir.path().to_path_buf();
    config.storage.vector_store_dir = dir.path().join("vector_store");
    config.storage.documents_dir = dir.path().join("documents");
    config.storage.metadata_dir = dir.path().join("metadata");
    // Small semantic chunks so each fixture paragraph stands alone
    config.chunking.strategy = ChunkStrategy::Semantic;
    config.chunking.chunk_size = 40;
    config.chunking.chunk_overlap = 0;

    let mut embeddings = EmbeddingRegistry::new("hash");
    embeddings.register(Arc::new(HashEmbeddings::new(DIMENSION)));

    let index_store = Arc::new(IndexStore::new(Arc::new(FsStorage::new(
        config.storage.vector_store_dir.clone(),
    ))));
    let metadata = Arc::new(MetadataStore::new(config.storage.metadata_dir.clone()));
    let service = DocumentService::new(
        Arc::new(config),
        index_store.clone(),
        metadata,
        Arc::new(embeddings),
    );

    Stack {
        service,
        engine: RetrievalEngine::new(index_store),
        provider: HashEmbeddings::new(DIMENSION),
        _dir: dir,
    }
}

#[tokio::test]
async fn test_uploaded_text_is_retrievable() {
    let stack = stack();
    let record = stack
        .service
        .upload(RUST_NOTES.as_bytes().to_vec(), "rust.txt", "session-a", None)
        .await
        .unwrap();
    assert_eq!(record.chunk_count, 3);

    let query = stack
        .provider
        .embed_query("Crabs live in oceans worldwide.")
        .await
        .unwrap();
    let results = stack
        .engine
        .search_multi(&[record.doc_id.clone()], &query, 3, 3)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].text, "Crabs live in oceans worldwide.");
    assert_eq!(results[0].doc_id, record.doc_id);
    // A plain-text upload is a single page
    assert_eq!(results[0].page_num, Some(1));
    assert!(results[0].score > 0.999);
}

#[tokio::test]
async fn test_search_merges_documents_from_one_session() {
    let stack = stack();
    let rust = stack
        .service
        .upload(RUST_NOTES.as_bytes().to_vec(), "rust.txt", "session-a", None)
        .await
        .unwrap();
    let baking = stack
        .service
        .upload(BAKING_NOTES.as_bytes().to_vec(), "baking.txt", "session-a", None)
        .await
        .unwrap();

    let doc_ids: Vec<String> = stack
        .service
        .list_by_session("session-a")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.doc_id)
        .collect();
    assert_eq!(doc_ids.len(), 2);

    let query = stack.provider.embed_query("dough and compilers").await.unwrap();
    let results = stack
        .engine
        .search_multi(&doc_ids, &query, 3, 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 6);
    assert!(results.iter().any(|r| r.doc_id == rust.doc_id));
    assert!(results.iter().any(|r| r.doc_id == baking.doc_id));
}

#[tokio::test]
async fn test_deleting_one_document_leaves_the_other_searchable() {
    let stack = stack();
    let rust = stack
        .service
        .upload(RUST_NOTES.as_bytes().to_vec(), "rust.txt", "session-a", None)
        .await
        .unwrap();
    let baking = stack
        .service
        .upload(BAKING_NOTES.as_bytes().to_vec(), "baking.txt", "session-a", None)
        .await
        .unwrap();

    assert!(stack.service.delete(&rust.doc_id, "session-a").await.unwrap());

    // Searching the stale id list just skips the deleted document
    let query = stack.provider.embed_query("Sourdough needs a starter.").await.unwrap();
    let results = stack
        .engine
        .search_multi(&[rust.doc_id.clone(), baking.doc_id.clone()], &query, 3, 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.doc_id == baking.doc_id));
    assert_eq!(results[0].text, "Sourdough needs a starter.");
}

#[tokio::test]
async fn test_foreign_session_cannot_delete_or_list() {
    let stack = stack();
    let record = stack
        .service
        .upload(RUST_NOTES.as_bytes().to_vec(), "rust.txt", "session-a", None)
        .await
        .unwrap();

    assert!(!stack.service.delete(&record.doc_id, "session-b").await.unwrap());
    assert!(stack.service.list_by_session("session-b").await.unwrap().is_empty());

    // Still present and searchable for its owner
    let query = stack.provider.embed_query("Rust ships a borrow checker.").await.unwrap();
    let results = stack
        .engine
        .search_multi(&[record.doc_id.clone()], &query, 1, 1)
        .await
        .unwrap();
    assert_eq!(results[0].text, "Rust ships a borrow checker.");
}
