mod common;

use common::{catalog_for, media_server, FakeRunner, FakeStore, Harness, RunnerMode};
use reel_models::{EncodingStrategyKind, JobId, JobStage, RenderRequest};
use reel_storage::ArtifactStore;
use std::sync::{Arc, Mutex};

fn request(server_uri: &str, mood: &str, narration: &str) -> RenderRequest {
    let body = (1..=40).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
    RenderRequest::new("Test hook", body, mood, format!("{server_uri}/{narration}"))
}

#[tokio::test]
async fn test_successful_render_is_delivered() {
    let server = media_server().await;
    let harness = Harness::new();
    let runner = FakeRunner::new(RunnerMode::Succeed);
    let orch = harness.orchestrator(catalog_for(&server), runner.clone(), None);

    let job_id = JobId::from_string("job-ok");
    let result = orch
        .render_with_id(job_id.clone(), &request(&server.uri(), "calm", "narration.mp3"))
        .await;

    assert!(result.succeeded, "unexpected failure: {:?}", result.error_detail);
    assert_eq!(result.job_id, job_id);
    assert_eq!(result.encoding_strategy_used, Some(EncodingStrategyKind::Conservative));
    assert!(result.byte_size > 0);
    assert!(result.output_path.exists());
    assert_eq!(
        result.output_path,
        harness.config.output_dir.join("job-ok_Test_hook.mp4")
    );
    assert_eq!(runner.calls(), 1);
    assert_eq!(harness.leftover_workspaces(), 0);
    assert!(result.storage_key.is_none());
}

#[tokio::test]
async fn test_unknown_mood_makes_no_requests() {
    let server = media_server().await;
    let harness = Harness::new();
    let runner = FakeRunner::new(RunnerMode::Succeed);
    let orch = harness.orchestrator(catalog_for(&server), runner.clone(), None);

    let result = orch.render(&request(&server.uri(), "unknown", "narration.mp3")).await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind.as_deref(), Some("unknown_mood_error"));
    assert_eq!(result.failed_stage, Some(JobStage::Created));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(runner.calls(), 0);
    assert_eq!(harness.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_three_byte_narration_fails_before_encoding() {
    let server = media_server().await;
    let harness = Harness::new();
    let runner = FakeRunner::new(RunnerMode::Succeed);
    let orch = harness.orchestrator(catalog_for(&server), runner.clone(), None);

    let result = orch.render(&request(&server.uri(), "calm", "tiny.mp3")).await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind.as_deref(), Some("fetch_error"));
    assert_eq!(result.failed_stage, Some(JobStage::Fetching));
    assert_eq!(runner.calls(), 0);
    assert_eq!(harness.leftover_workspaces(), 0);
    assert!(harness.delivered_files().is_empty());
}

#[tokio::test]
async fn test_exhausted_ladder_reports_encoding_error() {
    let server = media_server().await;
    let harness = Harness::new();
    let runner = FakeRunner::new(RunnerMode::MuxWithoutAudio);
    let orch = harness.orchestrator(catalog_for(&server), runner.clone(), None);

    let result = orch.render(&request(&server.uri(), "calm", "narration.mp3")).await;

    assert!(!result.succeeded);
    assert_eq!(result.error_kind.as_deref(), Some("encoding_error"));
    assert_eq!(result.failed_stage, Some(JobStage::Encoding));
    assert!(result.error_detail.unwrap().contains("no audio stream"));
    // conservative, minimal, then the three direct-mux passes
    assert_eq!(runner.calls(), 5);
    assert!(harness.delivered_files().is_empty());
    assert_eq!(harness.leftover_workspaces(), 0);
}

#[tokio::test]
async fn test_upload_key_is_recorded() {
    let server = media_server().await;
    let harness = Harness::new();
    let store = Arc::new(FakeStore {
        fail: false,
        keys: Mutex::new(Vec::new()),
    });
    let orch = harness.orchestrator(
        catalog_for(&server),
        FakeRunner::new(RunnerMode::Succeed),
        Some(store.clone() as Arc<dyn ArtifactStore>),
    );

    let result = orch
        .render_with_id(JobId::from_string("job-up"), &request(&server.uri(), "calm", "narration.mp3"))
        .await;

    assert!(result.succeeded);
    assert_eq!(result.storage_key.as_deref(), Some("renders/job-up/job-up_Test_hook.mp4"));
    assert_eq!(store.keys.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_failure_does_not_fail_job() {
    let server = media_server().await;
    let harness = Harness::new();
    let store: Arc<dyn ArtifactStore> = Arc::new(FakeStore {
        fail: true,
        keys: Mutex::new(Vec::new()),
    });
    let orch = harness.orchestrator(catalog_for(&server), FakeRunner::new(RunnerMode::Succeed), Some(store));

    let result = orch.render(&request(&server.uri(), "calm", "narration.mp3")).await;

    assert!(result.succeeded);
    assert!(result.storage_key.is_none());
    assert!(result.output_path.exists());
}
