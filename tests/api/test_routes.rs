// Route registration and service-level endpoints

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` and `ready`

use pdf_agent_node::api::router;
use pdf_agent_node::config::{Config, VERSION};
use pdf_agent_node::context::AppContext;

fn test_context(dir: &tempfile::TempDir) -> AppContext {
    let mut config = Config::default();
    config.storage.storage_dir = dir.path().to_path_buf();
    config.storage.vector_store_dir = dir.path().join("vector_store");
    config.storage.documents_dir = dir.path().join("documents");
    config.storage.metadata_dir = dir.path().join("metadata");
    // The hash provider needs no external service
    config.providers.default_embedding_provider = "hash".to_string();
    AppContext::build(config).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_configured_providers() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], VERSION);
    assert!(body["timestamp"].is_string());

    let embedding: Vec<&str> = body["embedding_providers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(embedding.contains(&"hash"));
    assert!(embedding.contains(&"ollama"));
    // No API key configured, so no OpenAI entries
    assert!(!embedding.contains(&"openai"));
    assert_eq!(body["llm_providers"], serde_json::json!(["ollama"]));
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["app"], "PDF-to-Agent");
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["upload"], "/v1/documents");
    assert_eq!(body["endpoints"]["query"], "/v1/query");
    assert_eq!(body["endpoints"]["compare"], "/v1/compare");
    assert_eq!(body["endpoints"]["health"], "/health");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/v2/nothing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_returns_405() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/v1/query")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
