//! Video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "veryfast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 23;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Output frame rate pinned on every attempt
pub const DEFAULT_FPS: u32 = 30;
/// Target video bitrate for the bounded strategy
pub const DEFAULT_VIDEO_BITRATE: &str = "3500k";
/// Peak video bitrate for the bounded strategy
pub const DEFAULT_MAX_RATE: &str = "4000k";
/// Rate-control buffer for the bounded strategy
pub const DEFAULT_BUF_SIZE: &str = "8000k";
/// Pixel format understood by mobile players
pub const DEFAULT_PIX_FMT: &str = "yuv420p";

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "veryfast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Average video bitrate cap
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    /// Peak video bitrate
    #[serde(default = "default_max_rate")]
    pub max_rate: String,

    /// Rate-control buffer size
    #[serde(default = "default_buf_size")]
    pub buf_size: String,

    /// Output pixel format
    #[serde(default = "default_pix_fmt")]
    pub pix_fmt: String,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_video_bitrate() -> String {
    DEFAULT_VIDEO_BITRATE.to_string()
}
fn default_max_rate() -> String {
    DEFAULT_MAX_RATE.to_string()
}
fn default_buf_size() -> String {
    DEFAULT_BUF_SIZE.to_string()
}
fn default_pix_fmt() -> String {
    DEFAULT_PIX_FMT.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            preset: default_preset(),
            crf: DEFAULT_CRF,
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            fps: DEFAULT_FPS,
            video_bitrate: default_video_bitrate(),
            max_rate: default_max_rate(),
            buf_size: default_buf_size(),
            pix_fmt: default_pix_fmt(),
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Returns a new config with a different output frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Audio codec arguments shared by every strategy.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }
}

/// Rung of the encoder fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategyKind {
    /// Bounded bitrate, single thread, fast preset
    Conservative,
    /// Codec and frame-rate pinning only
    Minimal,
    /// Separate video/audio renders multiplexed with explicit stream mapping
    DirectMux,
}

impl EncodingStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingStrategyKind::Conservative => "conservative",
            EncodingStrategyKind::Minimal => "minimal",
            EncodingStrategyKind::DirectMux => "direct_mux",
        }
    }
}

impl fmt::Display for EncodingStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"crf": 20}"#).unwrap();
        assert_eq!(config.crf, 20);
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.codec, DEFAULT_VIDEO_CODEC);
    }

    #[test]
    fn test_audio_args() {
        let args = EncodingConfig::default().audio_args();
        assert_eq!(args, vec!["-c:a", "aac", "-b:a", "128k"]);
    }

    #[test]
    fn test_fps_never_zero() {
        assert_eq!(EncodingConfig::default().with_fps(0).fps, 1);
    }
}
