//! Wire-contract tests: drive the real client against a local mock agent.

use std::net::SocketAddr;

use axum::extract::Multipart;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use mailbucket::client::AgentClient;

async fn start_mock_agent() -> SocketAddr {
    let app = Router::new()
        .route("/chat", post(mock_chat))
        .route("/upload", post(mock_upload));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr) -> AgentClient {
    AgentClient::new(&format!("http://{}", addr))
}

/// A port that was bound and released, so nothing is listening on it.
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn mock_chat(Json(body): Json<Value>) -> Json<Value> {
    match body["message"].as_str() {
        Some("boom") => Json(json!({ "success": false, "error": "agent exploded" })),
        Some(message) => {
            Json(json!({ "success": true, "response": format!("echo: {}", message) }))
        }
        None => Json(json!({ "success": false, "error": "missing message field" })),
    }
}

async fn mock_upload(mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            if filename.ends_with(".exe") {
                return Json(json!({ "success": false, "error": "file type not allowed" }));
            }
            if bytes.is_empty() {
                return Json(json!({ "success": false, "error": "empty file" }));
            }
            return Json(json!({ "success": true, "filename": filename }));
        }
    }
    Json(json!({ "success": false, "error": "missing file field" }))
}

#[tokio::test]
async fn chat_round_trip() {
    let addr = start_mock_agent().await;
    let client = client_for(addr);

    let reply = client.chat("hello").await.unwrap();

    assert!(reply.success);
    assert_eq!(reply.response.as_deref(), Some("echo: hello"));
    assert!(reply.error.is_none());
}

#[tokio::test]
async fn chat_application_error_passes_through_verbatim() {
    let addr = start_mock_agent().await;
    let client = client_for(addr);

    let reply = client.chat("boom").await.unwrap();

    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("agent exploded"));
}

#[tokio::test]
async fn chat_transport_failure_is_an_error_not_a_panic() {
    let client = client_for(dead_addr().await);

    assert!(client.chat("hello").await.is_err());
}

#[tokio::test]
async fn upload_reports_the_stored_filename() {
    let addr = start_mock_agent().await;
    let client = client_for(addr);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.pdf");
    std::fs::write(&path, b"%PDF-1.4 fake report").unwrap();

    let outcome = client.upload(&path).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.filename.as_deref(), Some("a.pdf"));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn upload_application_error_passes_through_verbatim() {
    let addr = start_mock_agent().await;
    let client = client_for(addr);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tool.exe");
    std::fs::write(&path, b"MZ").unwrap();

    let outcome = client.upload(&path).await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("file type not allowed"));
    assert!(outcome.filename.is_none());
}

#[tokio::test]
async fn upload_transport_failure_is_an_error_not_a_panic() {
    let client = client_for(dead_addr().await);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.pdf");
    std::fs::write(&path, b"content").unwrap();

    assert!(client.upload(&path).await.is_err());
}

#[tokio::test]
async fn upload_of_a_missing_file_fails_before_any_request() {
    // Point at a live server: the error must come from the local read.
    let addr = start_mock_agent().await;
    let client = client_for(addr);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-there.pdf");

    let err = client.upload(&path).await.unwrap_err();
    assert!(err.to_string().contains("could not read"));
}
