use super::mocks::MockLlmClient;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use medscan_rust::{
    assistant::MedicalAssistant,
    config::LlmConfig,
    llm::LlmClient,
    server::{self, handlers::AppState},
    session::{Session, SessionStore},
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;
use uuid::Uuid;

pub const BOUNDARY: &str = "medscan-test-boundary";

pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Ten bytes of arbitrary content standing in for an image.
pub const PHOTO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x01";

/// Create a test LLM configuration with the production defaults
pub fn create_test_llm_config() -> LlmConfig {
    LlmConfig {
        api_key: "test-api-key".to_string(),
        ..LlmConfig::default()
    }
}

/// Create a temporary directory for uploads
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn create_assistant(mock: &Arc<MockLlmClient>) -> MedicalAssistant {
    let llm_client: Arc<dyn LlmClient> = mock.clone();
    MedicalAssistant::new(llm_client, &create_test_llm_config())
}

pub fn create_session(dir: &TempDir) -> Session {
    Session::new(Uuid::new_v4(), dir.path())
}

/// Number of entries left in the upload directory
pub fn files_in(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

pub fn create_test_app(mock: &Arc<MockLlmClient>, dir: &TempDir) -> Router {
    let state = AppState {
        sessions: Arc::new(SessionStore::new(dir.path(), Duration::from_secs(60))),
        assistant: Arc::new(create_assistant(mock)),
    };
    server::router(state, TEST_MAX_UPLOAD_BYTES)
}

pub fn multipart_request(uri: &str, field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
