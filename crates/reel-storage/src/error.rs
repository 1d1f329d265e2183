//! Storage error types.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or unusable R2 settings.
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    #[error("Upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("Object key '{0}' is empty or absolute")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn upload(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Upload {
            key: key.into(),
            message: message.to_string(),
        }
    }
}
