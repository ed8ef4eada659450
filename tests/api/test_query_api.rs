// Query and comparison endpoint behavior over the HTTP surface.
// These tests never reach an external provider: validation failures stop
// at the handler and an empty session short-circuits before any model call.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` and `ready`

use pdf_agent_node::api::router;
use pdf_agent_node::config::Config;
use pdf_agent_node::context::AppContext;

fn test_context(dir: &tempfile::TempDir) -> AppContext {
    let mut config = Config::default();
    config.storage.storage_dir = dir.path().to_path_buf();
    config.storage.vector_store_dir = dir.path().join("vector_store");
    config.storage.documents_dir = dir.path().join("documents");
    config.storage.metadata_dir = dir.path().join("metadata");
    config.providers.default_embedding_provider = "hash".to_string();
    AppContext::build(config).unwrap()
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_query_with_no_documents_returns_guidance() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(post_json(
            "/v1/query",
            json!({"question": "What is in my documents?", "session_id": "nobody-home"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["answer"],
        "No documents found in this session. Please upload a PDF first."
    );
    assert_eq!(body["sources"], json!([]));
    assert_eq!(body["doc_ids_used"], json!([]));
    assert_eq!(body["metadata"]["error"], "no_documents");
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(post_json(
            "/v1/query",
            json!({"question": "   ", "session_id": "session-a"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "question");
}

#[tokio::test]
async fn test_top_k_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&dir);

    for bad_top_k in [0, 21] {
        let response = router(context.clone())
            .oneshot(post_json(
                "/v1/query",
                json!({"question": "q", "session_id": "s", "top_k": bad_top_k}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error_type"], "validation_error");
        assert_eq!(body["details"]["field"], "top_k");
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/v1/query")
                .header("content-type", "application/json")
                .body(Body::from("{not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compare_rejects_a_single_document() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(post_json(
            "/v1/compare",
            json!({"question": "q", "doc_ids": ["only-one"], "session_id": "s"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_request");
    assert_eq!(body["message"], "At least 2 documents required for comparison");
}

#[tokio::test]
async fn test_compare_caps_the_document_count() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let ids: Vec<String> = (0..11).map(|i| format!("doc-{}", i)).collect();
    let response = app
        .oneshot(post_json(
            "/v1/compare",
            json!({"question": "q", "doc_ids": ids, "session_id": "s"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Maximum 10 documents for comparison");
}
