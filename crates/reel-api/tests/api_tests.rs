//! API integration tests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use reel_api::{create_router, ApiConfig, AppState};
use reel_media::{FfmpegCommand, MediaInfo, MediaProbe, MediaResult, ProcessOutput, ProcessRunner};
use reel_worker::{MoodCatalog, RenderOrchestrator, WorkerConfig};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StubProbe;

#[async_trait]
impl MediaProbe for StubProbe {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        let background = path.to_string_lossy().ends_with("background.mp4");
        Ok(MediaInfo {
            duration: if background { 30.0 } else { 12.0 },
            width: if background { 1080 } else { 0 },
            height: if background { 1920 } else { 0 },
            has_video: background,
            has_audio: !background,
            video_codec: None,
            audio_codec: None,
        })
    }
}

/// Always succeeds and writes a small output file.
struct StubRunner;

#[async_trait]
impl ProcessRunner for StubRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput> {
        tokio::fs::write(cmd.output_path(), b"rendered").await?;
        Ok(ProcessOutput {
            success: true,
            exit_code: Some(0),
            diagnostics: "Stream #0:1: Audio: aac".to_string(),
        })
    }
}

async fn media_server() -> MockServer {
    let server = MockServer::start().await;
    let mut mp3 = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    mp3.resize(4096, 0);
    let mut mp4 = vec![0x00, 0x00, 0x00, 0x20];
    mp4.extend_from_slice(b"ftypisom");
    mp4.resize(32 * 1024, 0);

    Mock::given(method("GET"))
        .and(path("/voice.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mp3))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tiny.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bg.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mp4))
        .mount(&server)
        .await;
    server
}

fn create_test_router(server: &MockServer, root: &TempDir) -> Router {
    let catalog = MoodCatalog::from_json_str(&format!(r#"{{"toxic": ["{}/bg.mp4"]}}"#, server.uri())).unwrap();
    let worker_config = WorkerConfig {
        work_dir: root.path().join("work"),
        output_dir: root.path().join("out"),
        ..Default::default()
    };
    let orchestrator = RenderOrchestrator::with_components(
        worker_config,
        Arc::new(catalog),
        Arc::new(StubProbe),
        Arc::new(StubRunner),
        None,
    )
    .unwrap();

    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::new(ApiConfig::default(), orchestrator), Some(handle))
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["moods"], json!(["toxic"]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_render_success() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let body = json!({
        "hook": "Test hook",
        "body": "one two three four five six seven",
        "mood": "toxic",
        "narration_url": format!("{}/voice.mp3", server.uri()),
    });
    let response = app.oneshot(post_json("/render", body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let result = body_json(response).await;
    assert_eq!(result["succeeded"], json!(true));
    assert_eq!(result["encoding_strategy_used"], json!("conservative"));
    assert!(Path::new(result["output_path"].as_str().unwrap()).exists());
}

#[tokio::test]
async fn test_render_failure_returns_500_with_result() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let body = json!({
        "hook": "Test hook",
        "mood": "toxic",
        "narration_url": format!("{}/tiny.mp3", server.uri()),
    });
    let response = app.oneshot(post_json("/render", body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let result = body_json(response).await;
    assert_eq!(result["succeeded"], json!(false));
    assert_eq!(result["error_kind"], json!("fetch_error"));
}

#[tokio::test]
async fn test_unknown_mood_is_bad_request() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let body = json!({
        "hook": "Test hook",
        "mood": "unknown",
        "narration_url": format!("{}/voice.mp3", server.uri()),
    });
    let response = app.oneshot(post_json("/render", body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], json!("unknown_mood_error"));
    assert!(error["detail"].as_str().unwrap().contains("unknown"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_narration_url_is_bad_request() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let body = json!({
        "hook": "Test hook",
        "mood": "toxic",
        "narration_url": "file:///etc/passwd",
    });
    let response = app.oneshot(post_json("/render", body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], json!("invalid_request_error"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let response = app
        .oneshot(post_json("/render", r#"{"hook": 5}"#.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert_eq!(error["code"], json!("bad_request"));
}

#[tokio::test]
async fn test_batch_render() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let body = json!({
        "requests": [
            {"hook": "First", "mood": "toxic", "narration_url": format!("{}/voice.mp3", server.uri())},
            {"hook": "Second", "mood": "toxic", "narration_url": format!("{}/tiny.mp3", server.uri())},
        ],
        "max_concurrency": 2,
    });
    let response = app.oneshot(post_json("/render/batch", body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["total"], json!(2));
    assert_eq!(summary["succeeded"], json!(1));
    assert_eq!(summary["failed"], json!(1));
}

#[tokio::test]
async fn test_empty_batch_is_bad_request() {
    let server = media_server().await;
    let root = tempfile::tempdir().unwrap();
    let app = create_test_router(&server, &root);

    let response = app
        .oneshot(post_json("/render/batch", json!({"requests": []}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
