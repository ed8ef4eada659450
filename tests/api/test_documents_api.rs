// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Document upload, listing and deletion over the HTTP surface, using
// hand-built multipart bodies and the offline hash embedding provider.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` and `ready`

use pdf_agent_node::api::router;
use pdf_agent_node::config::Config;
use pdf_agent_node::context::AppContext;

const BOUNDARY: &str = "----test-boundary-4f9a27c1";
const FILE_TEXT: &str =
    "Rust ships a borrow checker.\n\nCrabs live in oceans worldwide.\n\nCompilers can be friendly.";

fn test_context(dir: &tempfile::TempDir) -> AppContext {
    let mut config = Config::default();
    config.storage.storage_dir = dir.path().to_path_buf();
    config.storage.vector_store_dir = dir.path().join("vector_store");
    config.storage.documents_dir = dir.path().join("documents");
    config.storage.metadata_dir = dir.path().join("metadata");
    config.providers.default_embedding_provider = "hash".to_string();
    AppContext::build(config).unwrap()
}

/// Build a multipart/form-data request from (name, filename, value) parts
fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, filename, value) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match filename {
            Some(f) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                name, f
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method(Method::POST)
        .uri("/v1/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_list_delete_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&dir);

    // Upload
    let response = router(context.clone())
        .oneshot(upload_request(&[
            ("file", Some("notes.txt"), FILE_TEXT),
            ("session_id", None, "session-api"),
            ("embedding_provider", None, "hash"),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    let doc_id = uploaded["doc_id"].as_str().unwrap().to_string();
    assert!(!doc_id.is_empty());
    assert_eq!(uploaded["session_id"], "session-api");
    assert_eq!(uploaded["filename"], "notes.txt");
    assert_eq!(uploaded["num_pages"], 1);
    assert!(uploaded["num_chunks"].as_u64().unwrap() >= 1);
    assert_eq!(
        uploaded["message"],
        "Document uploaded and processed successfully"
    );

    // List
    let response = router(context.clone())
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/v1/documents/session-api")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["session_id"], "session-api");
    assert_eq!(listed["total_count"], 1);
    assert_eq!(listed["documents"][0]["doc_id"], doc_id.as_str());
    assert_eq!(listed["documents"][0]["embedding_provider"], "hash");

    // Delete
    let response = router(context.clone())
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/v1/documents/{}?session_id=session-api", doc_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted = body_json(response).await;
    assert_eq!(deleted["message"], "Document deleted successfully");
    assert_eq!(deleted["doc_id"], doc_id.as_str());

    // The session is empty again
    let response = router(context.clone())
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/v1/documents/session-api")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["total_count"], 0);

    // Deleting again is a 404
    let response = router(context)
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/v1/documents/{}?session_id=session-api", doc_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "not_found");
    assert_eq!(body["message"], "Document not found or not authorized");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(upload_request(&[("session_id", None, "session-api")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "file");
}

#[tokio::test]
async fn test_upload_unsupported_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_context(&dir));

    let response = app
        .oneshot(upload_request(&[
            ("file", Some("archive.zip"), "PK\u{3}\u{4}fake"),
            ("session_id", None, "session-api"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_request");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported file type"));
}

#[tokio::test]
async fn test_upload_generates_session_id_when_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&dir);

    let response = router(context.clone())
        .oneshot(upload_request(&[("file", Some("notes.txt"), FILE_TEXT)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;

    // The server minted a session; clients must read it back to reuse it
    let session_id = uploaded["session_id"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());

    let response = router(context)
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(format!("/v1/documents/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["total_count"], 1);
}

#[tokio::test]
async fn test_wrong_session_cannot_delete() {
    let dir = tempfile::tempdir().unwrap();
    let context = test_context(&dir);

    let response = router(context.clone())
        .oneshot(upload_request(&[
            ("file", Some("notes.txt"), FILE_TEXT),
            ("session_id", None, "session-a"),
        ]))
        .await
        .unwrap();
    let uploaded = body_json(response).await;
    let doc_id = uploaded["doc_id"].as_str().unwrap().to_string();

    let response = router(context.clone())
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/v1/documents/{}?session_id=session-b", doc_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Untouched for its owner
    let response = router(context)
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/v1/documents/session-a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["total_count"], 1);
}
