//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    /// Network failure, timeout, bad status or empty body.
    #[error("Fetch failed for {uri}: {message}")]
    FetchFailed { uri: String, message: String },

    /// Downloaded bytes are corrupt or not recognizable media.
    #[error("Verification failed for {path}: {message}")]
    VerificationFailed { path: PathBuf, message: String },

    /// Missing or zero dimensions/duration.
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    /// Not a single overlay clip could be produced.
    #[error("Composition failed: {0}")]
    CompositionFailed(String),

    /// Every encoding strategy was exhausted.
    #[error("Encoding failed after {attempts} attempts: {detail}")]
    EncodingFailed { attempts: usize, detail: String },

    #[error("Text rendering failed: {0}")]
    TextRender(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a fetch failure error.
    pub fn fetch_failed(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a verification failure error.
    pub fn verification_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::VerificationFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_media(message: impl Into<String>) -> Self {
        Self::InvalidMedia(message.into())
    }

    pub fn composition_failed(message: impl Into<String>) -> Self {
        Self::CompositionFailed(message.into())
    }

    pub fn text_render(message: impl Into<String>) -> Self {
        Self::TextRender(message.into())
    }

    /// Stable machine-readable category for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            MediaError::FetchFailed { .. } => "fetch_error",
            MediaError::VerificationFailed { .. } => "verification_error",
            MediaError::InvalidMedia(_) => "invalid_media_error",
            MediaError::CompositionFailed(_) | MediaError::TextRender(_) => "composition_error",
            MediaError::EncodingFailed { .. } => "encoding_error",
            MediaError::Timeout(_) => "timeout",
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound => "tool_missing",
            MediaError::FfmpegFailed { .. } | MediaError::FfprobeFailed { .. } => "tool_failed",
            MediaError::FileNotFound(_) | MediaError::Io(_) => "io_error",
            MediaError::JsonParse(_) => "parse_error",
        }
    }
}
