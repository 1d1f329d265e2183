//! Worker error types.

use reel_media::MediaError;
use reel_models::TimelineError;
use reel_storage::StorageError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Unknown mood '{0}'")]
    UnknownMood(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Timeline rejected: {0}")]
    Timeline(#[from] TimelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable category reported as `error_kind`.
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::UnknownMood(_) => "unknown_mood_error",
            WorkerError::InvalidRequest(_) => "invalid_request_error",
            WorkerError::Config(_) => "config_error",
            WorkerError::Media(e) => e.code(),
            WorkerError::Storage(_) => "storage_error",
            WorkerError::Timeline(_) => "composition_error",
            WorkerError::Io(_) => "io_error",
        }
    }

    /// Whether the request itself is at fault (as opposed to the render).
    pub fn is_client_error(&self) -> bool {
        matches!(self, WorkerError::UnknownMood(_) | WorkerError::InvalidRequest(_))
    }
}
