//! Worker configuration.

use reel_media::{ComposerConfig, FetchConfig};
use reel_models::{FrameSize, DEFAULT_MAX_DURATION_SECS};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Narration speed factors accepted for `REEL_AUDIO_TEMPO`.
const TEMPO_RANGE: std::ops::RangeInclusive<f64> = 0.5..=2.0;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Host cap on concurrently running jobs
    pub max_concurrency: usize,
    /// Root under which per-job workspaces are created
    pub work_dir: PathBuf,
    /// Where finished renders are delivered
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    /// Per encoder invocation
    pub encode_timeout: Duration,
    /// Hard cap on output length
    pub max_duration_secs: f64,
    /// Narration speed factor; `None` keeps the recorded speed
    pub audio_tempo: Option<f64>,
    pub caption_chunk_words: usize,
    pub max_caption_chunks: usize,
    /// Bold font for primary-style overlays
    pub font_path: Option<PathBuf>,
    /// JSON mood catalog; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Upload finished renders to R2
    pub upload_enabled: bool,
    pub target_frame: FrameSize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            work_dir: PathBuf::from("/tmp/reelcast"),
            output_dir: PathBuf::from("/tmp/reelcast/out"),
            fetch_timeout: Duration::from_secs(45),
            encode_timeout: Duration::from_secs(600),
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            audio_tempo: None,
            caption_chunk_words: 5,
            max_caption_chunks: 40,
            font_path: None,
            catalog_path: None,
            upload_enabled: false,
            target_frame: FrameSize::PORTRAIT_HD,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrency: env_parse("REEL_MAX_CONCURRENCY").unwrap_or(defaults.max_concurrency),
            work_dir: env_path("REEL_WORK_DIR").unwrap_or(defaults.work_dir),
            output_dir: env_path("REEL_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            fetch_timeout: env_parse("REEL_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            encode_timeout: env_parse("REEL_ENCODE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.encode_timeout),
            max_duration_secs: env_parse("REEL_MAX_DURATION_SECS").unwrap_or(defaults.max_duration_secs),
            audio_tempo: env_parse("REEL_AUDIO_TEMPO"),
            caption_chunk_words: env_parse("REEL_CAPTION_CHUNK_WORDS").unwrap_or(defaults.caption_chunk_words),
            max_caption_chunks: env_parse("REEL_MAX_CAPTION_CHUNKS").unwrap_or(defaults.max_caption_chunks),
            font_path: env_path("REEL_FONT_PATH"),
            catalog_path: env_path("REEL_CATALOG_PATH"),
            upload_enabled: env_parse("REEL_UPLOAD_ENABLED").unwrap_or(false),
            target_frame: defaults.target_frame,
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.max_concurrency == 0 {
            return Err(WorkerError::config_error("max_concurrency must be at least 1"));
        }
        if !(self.max_duration_secs.is_finite() && self.max_duration_secs > 0.0) {
            return Err(WorkerError::config_error("max_duration_secs must be positive"));
        }
        if self.caption_chunk_words == 0 {
            return Err(WorkerError::config_error("caption_chunk_words must be at least 1"));
        }
        if self.max_caption_chunks == 0 {
            return Err(WorkerError::config_error("max_caption_chunks must be at least 1"));
        }
        if let Some(tempo) = self.audio_tempo {
            if !TEMPO_RANGE.contains(&tempo) {
                return Err(WorkerError::config_error(format!(
                    "audio tempo {tempo} outside {}..={}",
                    TEMPO_RANGE.start(),
                    TEMPO_RANGE.end()
                )));
            }
        }
        Ok(())
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: self.fetch_timeout,
            ..FetchConfig::default()
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            caption_chunk_words: self.caption_chunk_words,
            max_caption_chunks: self.max_caption_chunks,
            title_max_secs: self.max_duration_secs,
            ..ComposerConfig::default()
        }
    }
}
