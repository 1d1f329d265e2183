//! Fetched media assets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of media a fetched asset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary resource fetched into the job workspace.
///
/// Fields are read-only from outside. Changing the content (`with_byte_size`)
/// always yields an unverified asset; the only way to obtain a verified one is
/// [`MediaAsset::into_verified`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaAsset {
    kind: MediaKind,
    source_uri: String,
    local_path: PathBuf,
    byte_size: u64,
    verified: bool,
}

impl MediaAsset {
    /// Create an empty asset for a pending fetch.
    pub fn new(kind: MediaKind, source_uri: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            source_uri: source_uri.into(),
            local_path: local_path.into(),
            byte_size: 0,
            verified: false,
        }
    }

    /// Record the number of bytes written for this asset.
    pub fn with_byte_size(self, byte_size: u64) -> Self {
        Self {
            byte_size,
            verified: false,
            ..self
        }
    }

    /// Mark the asset as having passed its sanity check.
    pub fn into_verified(self) -> Self {
        Self {
            verified: true,
            ..self
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let asset = MediaAsset::new(MediaKind::Audio, "https://x.test/a.mp3", "/tmp/a.mp3");
        assert_eq!(asset.byte_size(), 0);
        assert!(!asset.is_verified());

        let asset = asset.with_byte_size(2048).into_verified();
        assert!(asset.is_verified());
        assert_eq!(asset.byte_size(), 2048);
    }

    #[test]
    fn test_resize_drops_verification() {
        let asset = MediaAsset::new(MediaKind::Video, "u", "/tmp/v.mp4")
            .with_byte_size(10)
            .into_verified()
            .with_byte_size(20);
        assert!(!asset.is_verified());
    }
}
