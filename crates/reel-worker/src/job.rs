//! Single-job render orchestrator.

use async_trait::async_trait;
use reel_media::fs_utils::{move_file, non_empty_file_size};
use reel_media::{
    default_strategies, normalize, AssetFetcher, DrawtextRenderer, FallbackEncoder, FfmpegRunner, FfprobeProbe,
    MediaError, MediaProbe, OverlayComposer, ProcessRunner,
};
use reel_models::{
    resolve_duration, EncodingConfig, EncodingStrategyKind, FrameSize, JobId, JobStage, MediaKind, RenderRequest,
    RenderResult, Timeline,
};
use reel_storage::{output_file_name, render_key, ArtifactStore, R2Client};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use validator::Validate;

use crate::batch::JobRunner;
use crate::catalog::MoodCatalog;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::workspace::JobWorkspace;

/// What a successful pipeline run hands back before it becomes a result.
struct Delivered {
    output_path: PathBuf,
    byte_size: u64,
    strategy: EncodingStrategyKind,
    storage_key: Option<String>,
}

/// Stage machine for one job; every transition is checked and logged.
struct StageTracker {
    stage: JobStage,
    logger: JobLogger,
}

impl StageTracker {
    fn enter(&mut self, next: JobStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal stage transition {} -> {}",
            self.stage,
            next
        );
        if !self.stage.can_transition_to(next) {
            self.logger
                .log_error(&format!("illegal stage transition {} -> {}", self.stage, next));
        }
        self.stage = next;
        self.logger.set_stage(next);
    }
}

/// Runs one render request end to end.
///
/// Fetch, verify, normalize, compose and encode run in that order inside a
/// private workspace; the finished file is moved to the output directory and
/// optionally uploaded. The workspace is removed on every exit path.
pub struct RenderOrchestrator {
    config: Arc<WorkerConfig>,
    catalog: Arc<MoodCatalog>,
    fetcher: AssetFetcher,
    probe: Arc<dyn MediaProbe>,
    composer: OverlayComposer<DrawtextRenderer>,
    encoder: FallbackEncoder,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl RenderOrchestrator {
    /// Orchestrator backed by ffmpeg/ffprobe and, when enabled, R2.
    pub fn new(config: WorkerConfig, catalog: Arc<MoodCatalog>) -> WorkerResult<Self> {
        let runner = FfmpegRunner::new().with_timeout(config.encode_timeout.as_secs());
        let store: Option<Arc<dyn ArtifactStore>> = if config.upload_enabled {
            Some(Arc::new(R2Client::from_env()?))
        } else {
            None
        };
        Self::with_components(
            config,
            catalog,
            Arc::new(FfprobeProbe::new()),
            Arc::new(runner),
            store,
        )
    }

    /// Orchestrator with explicit probe, encoder runner and store.
    pub fn with_components(
        config: WorkerConfig,
        catalog: Arc<MoodCatalog>,
        probe: Arc<dyn MediaProbe>,
        runner: Arc<dyn ProcessRunner>,
        store: Option<Arc<dyn ArtifactStore>>,
    ) -> WorkerResult<Self> {
        config.validate()?;
        let fetcher = AssetFetcher::new(config.fetch_config())?;
        let composer = OverlayComposer::new(
            config.composer_config(),
            DrawtextRenderer::new(config.font_path.clone()),
        );
        let encoder = FallbackEncoder::new(default_strategies(), runner).with_config(EncodingConfig::default());

        Ok(Self {
            config: Arc::new(config),
            catalog,
            fetcher,
            probe,
            composer,
            encoder,
            store,
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    /// Reject requests that can never render, before any I/O.
    pub fn check_request(&self, request: &RenderRequest) -> WorkerResult<()> {
        request
            .validate()
            .map_err(|e| WorkerError::invalid_request(e.to_string()))?;
        if !self.catalog.contains(&request.mood) {
            return Err(WorkerError::UnknownMood(request.mood.to_string()));
        }
        Ok(())
    }

    pub async fn render(&self, request: &RenderRequest) -> RenderResult {
        self.render_with_id(JobId::new(), request).await
    }

    /// Render under a caller-chosen job ID. Never fails; errors are folded
    /// into a failed [`RenderResult`].
    pub async fn render_with_id(&self, job_id: JobId, request: &RenderRequest) -> RenderResult {
        let logger = JobLogger::new(&job_id, "render");
        let span = logger.create_span();
        self.run_job(job_id, request, logger).instrument(span).await
    }

    async fn run_job(&self, job_id: JobId, request: &RenderRequest, logger: JobLogger) -> RenderResult {
        let started = Instant::now();
        metrics::record_job_started();
        logger.log_start(&format!("mood={} hook_chars={}", request.mood, request.hook.chars().count()));

        let mut tracker = StageTracker {
            stage: JobStage::Created,
            logger,
        };
        let mut workspace: Option<JobWorkspace> = None;

        let outcome = self.run_stages(&job_id, request, &mut tracker, &mut workspace).await;
        let elapsed = started.elapsed().as_secs_f64();

        let result = match outcome {
            Ok(delivered) => {
                tracker.enter(JobStage::Succeeded);
                tracker.logger.log_completion(&format!(
                    "{} ({} bytes, strategy {}) in {:.1}s",
                    delivered.output_path.display(),
                    delivered.byte_size,
                    delivered.strategy,
                    elapsed
                ));
                metrics::record_job_completed(delivered.strategy, elapsed);
                let result = RenderResult::success(
                    job_id,
                    delivered.output_path,
                    delivered.byte_size,
                    delivered.strategy,
                    elapsed,
                );
                match delivered.storage_key {
                    Some(key) => result.with_storage_key(key),
                    None => result,
                }
            }
            Err(err) => {
                let failed_stage = tracker.stage;
                tracker.enter(JobStage::Failed);
                tracker
                    .logger
                    .log_error(&format!("{} failed [{}]: {}", failed_stage, err.code(), err));
                metrics::record_job_failed(failed_stage, err.code(), elapsed);
                RenderResult::failure(job_id, failed_stage, err.code(), err.to_string(), elapsed)
            }
        };

        if let Some(mut ws) = workspace.take() {
            ws.cleanup();
        }
        tracker.enter(JobStage::CleanedUp);
        result
    }

    async fn run_stages(
        &self,
        job_id: &JobId,
        request: &RenderRequest,
        tracker: &mut StageTracker,
        workspace: &mut Option<JobWorkspace>,
    ) -> WorkerResult<Delivered> {
        // Created: nothing touches the network or disk until the request is known good
        self.check_request(request)?;
        let background_uri = self.catalog.choose(&request.mood)?;

        tracker.enter(JobStage::Fetching);
        let ws = workspace.insert(JobWorkspace::create(&self.config.work_dir, job_id)?);
        let (narration_path, background_path) = (ws.narration_path(), ws.background_path());
        let fetch_started = Instant::now();
        let (narration, background) = tokio::try_join!(
            self.fetcher
                .fetch(&request.narration_url, &narration_path, MediaKind::Audio),
            self.fetcher
                .fetch(background_uri, &background_path, MediaKind::Video),
        )?;
        metrics::record_fetch(fetch_started.elapsed().as_secs_f64());
        tracker.logger.log_progress(&format!(
            "fetched narration ({} bytes) and background ({} bytes)",
            narration.byte_size(),
            background.byte_size()
        ));

        tracker.enter(JobStage::Verifying);
        let narration = self.fetcher.verify(narration).await?;
        let background = self.fetcher.verify(background).await?;

        tracker.enter(JobStage::Normalizing);
        let (audio_info, video_info) = tokio::try_join!(
            self.probe.probe(narration.local_path()),
            self.probe.probe(background.local_path()),
        )?;
        if !audio_info.has_audio {
            return Err(MediaError::invalid_media("narration has no audio stream").into());
        }
        if !video_info.has_video {
            return Err(MediaError::invalid_media("background has no video stream").into());
        }
        let geometry = normalize(
            FrameSize::new(video_info.width, video_info.height),
            self.config.target_frame,
        )?;
        let duration = resolve_duration(
            audio_info.require_duration()?,
            video_info.require_duration()?,
            self.config.max_duration_secs,
            self.config.audio_tempo,
        );
        tracker.logger.log_progress(&format!(
            "{}x{} -> {}x{} (cropped: {}), timeline {:.2}s",
            geometry.source_width,
            geometry.source_height,
            geometry.target_width,
            geometry.target_height,
            geometry.cropped,
            duration
        ));

        tracker.enter(JobStage::Composing);
        let overlays = self
            .composer
            .compose(&request.hook, &request.body, duration, self.config.target_frame)?;
        tracker
            .logger
            .log_progress(&format!("{} overlay clips composed", overlays.len()));
        let timeline = Timeline::new(
            background,
            narration,
            overlays,
            geometry,
            duration,
            self.config.audio_tempo,
        )?;

        tracker.enter(JobStage::Encoding);
        let render_path = ws.render_path();
        let outcome = self.encoder.encode(&timeline, &render_path).await?;
        for attempt in &outcome.attempts {
            metrics::record_encode_attempt(attempt.strategy, attempt.succeeded, attempt.elapsed_secs);
        }

        let file_name = output_file_name(job_id, &request.hook);
        let output_path = self.config.output_dir.join(&file_name);
        move_file(&outcome.output_path, &output_path).await?;
        let byte_size = non_empty_file_size(&output_path).await?;

        let storage_key = match &self.store {
            Some(store) => {
                let key = render_key(job_id, &file_name);
                match store.put_render(&output_path, &key).await {
                    Ok(()) => Some(key),
                    Err(e) => {
                        metrics::record_upload_failure();
                        tracker.logger.log_warning(&format!("upload of {key} failed: {e}"));
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Delivered {
            output_path,
            byte_size,
            strategy: outcome.strategy,
            storage_key,
        })
    }
}

#[async_trait]
impl JobRunner for RenderOrchestrator {
    async fn run_job(&self, job_id: JobId, request: RenderRequest) -> RenderResult {
        self.render_with_id(job_id, &request).await
    }
}
