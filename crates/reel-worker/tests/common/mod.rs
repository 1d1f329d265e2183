//! Fakes shared by the orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use reel_media::{FfmpegCommand, MediaInfo, MediaProbe, MediaResult, ProcessOutput, ProcessRunner};
use reel_storage::{ArtifactStore, StorageError, StorageResult};
use reel_worker::{MoodCatalog, RenderOrchestrator, WorkerConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WITH_AUDIO: &str = "Output #0, mp4, to 'render.mp4':\n  Stream #0:0: Video: h264\n  Stream #0:1: Audio: aac";
pub const WITHOUT_AUDIO: &str = "Output #0, mp4, to 'render.mp4':\n  Stream #0:0: Video: h264";

pub fn mp3_bytes() -> Vec<u8> {
    let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    bytes.resize(4096, 0);
    bytes
}

pub fn mp4_bytes() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x00, 0x00, 0x20];
    bytes.extend_from_slice(b"ftypisom");
    bytes.resize(32 * 1024, 0);
    bytes
}

/// Serves a narration, a 3-byte narration and one background clip.
pub async fn media_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/narration.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mp3_bytes()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tiny.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bg/calm.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mp4_bytes()))
        .mount(&server)
        .await;
    server
}

pub fn catalog_for(server: &MockServer) -> Arc<MoodCatalog> {
    let raw = format!(r#"{{"calm": ["{}/bg/calm.mp4"]}}"#, server.uri());
    Arc::new(MoodCatalog::from_json_str(&raw).unwrap())
}

/// Reports a 20 s narration and a 30 s landscape background.
pub struct FakeProbe;

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        let is_background = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("background"));
        Ok(if is_background {
            MediaInfo {
                duration: 30.0,
                width: 1920,
                height: 1080,
                has_video: true,
                has_audio: false,
                video_codec: Some("h264".into()),
                audio_codec: None,
            }
        } else {
            MediaInfo {
                duration: 20.0,
                has_audio: true,
                audio_codec: Some("mp3".into()),
                ..Default::default()
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerMode {
    /// Every invocation exits 0 and writes its output.
    Succeed,
    /// Composite passes exit 1; direct-mux passes succeed but negotiate no audio.
    MuxWithoutAudio,
}

/// Stands in for ffmpeg, tracking how many invocations overlap.
pub struct FakeRunner {
    mode: RunnerMode,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    outputs: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn new(mode: RunnerMode) -> Arc<Self> {
        Self::with_delay(mode, Duration::ZERO)
    }

    pub fn with_delay(mode: RunnerMode, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode,
            delay,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            outputs: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.outputs.lock().unwrap().push(cmd.output_path().to_path_buf());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let composite = cmd.input_count() == 2 && !cmd.build_args().iter().any(|a| a == "copy");
        let output = match self.mode {
            RunnerMode::Succeed => ProcessOutput {
                success: true,
                exit_code: Some(0),
                diagnostics: WITH_AUDIO.to_string(),
            },
            RunnerMode::MuxWithoutAudio if composite => ProcessOutput {
                success: false,
                exit_code: Some(1),
                diagnostics: "Error initializing complex filters".to_string(),
            },
            RunnerMode::MuxWithoutAudio => ProcessOutput {
                success: true,
                exit_code: Some(0),
                diagnostics: WITHOUT_AUDIO.to_string(),
            },
        };
        if output.success {
            tokio::fs::write(cmd.output_path(), b"rendered-video-bytes").await?;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(output)
    }
}

/// Store that records keys, or rejects every upload.
pub struct FakeStore {
    pub fail: bool,
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ArtifactStore for FakeStore {
    async fn put_render(&self, path: &Path, key: &str) -> StorageResult<()> {
        if self.fail {
            return Err(StorageError::upload(key, "bucket unavailable"));
        }
        assert!(path.exists());
        self.keys.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub root: TempDir,
    pub config: WorkerConfig,
}

impl Harness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = WorkerConfig {
            work_dir: root.path().join("work"),
            output_dir: root.path().join("out"),
            ..Default::default()
        };
        Self { root, config }
    }

    pub fn orchestrator(
        &self,
        catalog: Arc<MoodCatalog>,
        runner: Arc<FakeRunner>,
        store: Option<Arc<dyn ArtifactStore>>,
    ) -> RenderOrchestrator {
        RenderOrchestrator::with_components(self.config.clone(), catalog, Arc::new(FakeProbe), runner, store).unwrap()
    }

    /// Entries left under the work root (finished jobs leave none).
    pub fn leftover_workspaces(&self) -> usize {
        match std::fs::read_dir(&self.config.work_dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub fn delivered_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.config.output_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok().map(|e| e.path())).collect(),
            Err(_) => Vec::new(),
        }
    }
}
