use axum::{Router, http::StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

mod common;
use common::{
    MockLlmClient, PHOTO_BYTES, TEST_MAX_UPLOAD_BYTES, create_temp_dir, create_test_app,
    empty_request, files_in, json_request, multipart_request, read_json,
};
use medscan_rust::server::MULTIPART_OVERHEAD_BYTES;

async fn create_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(empty_request("POST", "/api/sessions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    body["session_id"].as_str().unwrap().to_string()
}

async fn send(app: &Router, request: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_index_page_has_controls() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Медицинская помощь с использованием мультимодального LLM"));
    assert!(html.contains("Анализ изображения"));
    assert!(html.contains("Объясни, как будто мне 5 лет"));
    assert!(html.contains(".jpg,.jpeg,.png"));
}

#[tokio::test]
async fn test_new_session_is_empty() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;

    let (status, view) = send(&app, empty_request("GET", &format!("/api/sessions/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "empty");
    assert_eq!(view["has_file"], false);
    assert_eq!(view["result"], Value::Null);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);

    let (status, body) = send(
        &app,
        empty_request(
            "POST",
            "/api/sessions/00000000-0000-0000-0000-000000000000/analyze",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Session not found"));
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "file",
            "scan.gif",
            PHOTO_BYTES,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported image type"));
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn test_upload_at_size_limit_is_accepted() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;
    let image = vec![0u8; TEST_MAX_UPLOAD_BYTES];

    let (status, view) = send(
        &app,
        multipart_request(&format!("/api/sessions/{id}/upload"), "file", "scan.jpg", &image),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "file_uploaded");
    assert_eq!(files_in(&dir), 1);
}

#[tokio::test]
async fn test_upload_far_over_limit_is_rejected() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;
    let image = vec![0u8; TEST_MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES + 1];

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "file",
            "scan.jpg",
            &image,
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(files_in(&dir), 0);
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;

    let (status, _) = send(
        &app,
        multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "attachment",
            "photo.png",
            PHOTO_BYTES,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_without_upload_reports_skip() {
    let dir = create_temp_dir();
    let mock = Arc::new(MockLlmClient::new().with_text("unused"));
    let app = create_test_app(&mock, &dir);
    let id = create_session(&app).await;

    let (status, view) = send(
        &app,
        empty_request("POST", &format!("/api/sessions/{id}/analyze")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["skipped"], true);
    assert_eq!(view["state"], "empty");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_service_failure_is_bad_gateway_and_keeps_file() {
    let dir = create_temp_dir();
    let mock = Arc::new(MockLlmClient::new().with_error("invalid api key"));
    let app = create_test_app(&mock, &dir);
    let id = create_session(&app).await;

    send(
        &app,
        multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "file",
            "photo.png",
            PHOTO_BYTES,
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        empty_request("POST", &format!("/api/sessions/{id}/analyze")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("invalid api key"));
    assert_eq!(files_in(&dir), 1);

    let (_, view) = send(&app, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(view["state"], "file_uploaded");
    assert_eq!(view["has_file"], true);
}

#[tokio::test]
async fn test_simplify_before_analysis_is_conflict() {
    let dir = create_temp_dir();
    let mock = Arc::new(MockLlmClient::new());
    let app = create_test_app(&mock, &dir);
    let id = create_session(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/simplify"),
            json!({ "simplify": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_delete_session_removes_pending_file() {
    let dir = create_temp_dir();
    let app = create_test_app(&Arc::new(MockLlmClient::new()), &dir);
    let id = create_session(&app).await;

    send(
        &app,
        multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "file",
            "photo.jpeg",
            PHOTO_BYTES,
        ),
    )
    .await;
    assert_eq!(files_in(&dir), 1);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(files_in(&dir), 0);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/sessions/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let dir = create_temp_dir();
    let mock = Arc::new(
        MockLlmClient::new()
            .with_text("Нет аномалий.")
            .with_text("Всё хорошо!"),
    );
    let app = create_test_app(&mock, &dir);
    let id = create_session(&app).await;

    let (status, view) = send(
        &app,
        multipart_request(
            &format!("/api/sessions/{id}/upload"),
            "file",
            "photo.png",
            PHOTO_BYTES,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "file_uploaded");
    assert_eq!(files_in(&dir), 1);

    let (status, view) = send(
        &app,
        empty_request("POST", &format!("/api/sessions/{id}/analyze")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["result"], "Нет аномалий.");
    assert_eq!(view["skipped"], false);
    assert_eq!(files_in(&dir), 0);

    let (status, view) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/simplify"),
            json!({ "simplify": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "simplified");
    assert_eq!(view["simplified"], "Всё хорошо!");
    assert_eq!(view["result"], "Нет аномалий.");

    let (status, view) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/simplify"),
            json!({ "simplify": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "analyzed");
    assert_eq!(view["simplified"], Value::Null);
    assert_eq!(mock.request_count(), 2);
}
