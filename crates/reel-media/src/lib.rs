#![deny(unreachable_patterns)]
//! Media pipeline for narrated vertical shorts.
//!
//! This crate provides:
//! - Streaming asset fetch with content sniffing before any heavy work
//! - FFprobe inspection of fetched media
//! - Scale-to-fill geometry normalization
//! - Title and caption overlay composition with degraded-mode rendering
//! - Type-safe FFmpeg command building and a diagnostics-capturing runner
//! - An ordered encoder fallback ladder

pub mod command;
pub mod encoder;
pub mod error;
pub mod fetch;
pub mod fs_utils;
pub mod geometry;
pub mod overlay;
pub mod probe;
pub mod progress;
pub mod sniff;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner, ProcessOutput, ProcessRunner};
pub use encoder::{
    confirm_audio_stream_present, default_strategies, EncodeAttempt, EncodeOutcome, EncodeStrategy,
    FallbackEncoder,
};
pub use error::{MediaError, MediaResult};
pub use fetch::{AssetFetcher, FetchConfig};
pub use geometry::{normalize, ASPECT_TOLERANCE};
pub use overlay::{ComposerConfig, DrawtextRenderer, OverlayComposer, TextRenderer};
pub use probe::{FfprobeProbe, MediaInfo, MediaProbe};
pub use progress::FfmpegProgress;
pub use sniff::verify_asset;
