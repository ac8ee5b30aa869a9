//! HTTP surface tests, driven in-process through the router.
//!
//! Multipart bodies are built by hand so no client library dictates the
//! framing; the router is exercised with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http_body_util::BodyExt;
use tower::ServiceExt;

use idphoto_api_http::rate_limiter::RateLimiter;
use idphoto_api_http::{AppState, HttpServer};
use idphoto_core::application::PhotoPipeline;
use idphoto_core::port::background_editor::mocks::MockBackgroundEditor;
use idphoto_core::port::image_transformer::mocks::MockImageTransformer;
use idphoto_core::port::time_provider::mocks::MockTimeProvider;

const BOUNDARY: &str = "test-boundary-4xQ9pZ";

fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"portrait.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn generate_request(field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, data)))
        .unwrap()
}

/// Pipeline on mock ports: transformer stubs every imaging step, the editor
/// behavior is the caller's choice.
fn mock_pipeline(editor: Arc<MockBackgroundEditor>) -> Arc<PhotoPipeline> {
    Arc::new(PhotoPipeline::with_defaults(
        Arc::new(MockImageTransformer::new()),
        editor,
        Arc::new(MockTimeProvider::default()),
    ))
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = HttpServer::router(Arc::new(state))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn missing_image_field_answers_400_no_file() {
    let state = AppState::new(mock_pipeline(Arc::new(MockBackgroundEditor::new_success())));

    let (status, body) = send(state, generate_request("attachment", b"some bytes")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file");
}

#[tokio::test]
async fn empty_file_answers_400_no_file() {
    let state = AppState::new(mock_pipeline(Arc::new(MockBackgroundEditor::new_success())));

    let (status, body) = send(state, generate_request("image", b"")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file");
}

#[tokio::test]
async fn unconfigured_server_answers_500_before_processing() {
    let state = AppState::unconfigured("GEMINI_API_KEY is not configured");

    let (status, body) = send(state, generate_request("image", b"valid enough")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn happy_path_answers_data_uri() {
    let editor = Arc::new(MockBackgroundEditor::new_success());
    let state = AppState::new(mock_pipeline(editor.clone()));

    let (status, body) = send(state, generate_request("image", b"fake jpeg bytes")).await;

    assert_eq!(status, StatusCode::OK);
    let image = body["image"].as_str().unwrap();
    let payload = image.strip_prefix("data:image/jpeg;base64,").unwrap();
    assert_eq!(BASE64.decode(payload).unwrap(), b"cropped");
    assert_eq!(editor.call_count(), 1);
}

#[tokio::test]
async fn editor_flakiness_is_invisible_to_http_clients() {
    let editor = Arc::new(MockBackgroundEditor::new_fail("api down"));
    let state = AppState::new(mock_pipeline(editor.clone()));

    let (status, body) = send(state, generate_request("image", b"fake jpeg bytes")).await;

    // Retries exhausted, composite fallback - still a 200
    assert_eq!(status, StatusCode::OK);
    assert_eq!(editor.call_count(), 3);
    assert!(body["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn oversized_upload_answers_400() {
    let state = AppState::new(mock_pipeline(Arc::new(MockBackgroundEditor::new_success())));

    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let (status, body) = send(state, generate_request("image", &oversized)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("File too large"));
}

#[tokio::test]
async fn burst_above_rate_limit_answers_429() {
    let state = Arc::new(AppState::with_rate_limiter(
        mock_pipeline(Arc::new(MockBackgroundEditor::new_success())),
        RateLimiter::new(1, 1),
    ));
    let router = HttpServer::router(state);

    let first = router
        .clone()
        .oneshot(generate_request("image", b"fake jpeg bytes"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(generate_request("image", b"fake jpeg bytes"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn health_probe_reports_ok() {
    let state = AppState::unconfigured("no key needed for health");

    let response = HttpServer::router(Arc::new(state))
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}
