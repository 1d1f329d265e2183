//! FFmpeg `-progress` state.

use serde::{Deserialize, Serialize};

/// Snapshot assembled from one block of `-progress` key/value lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    pub frame: u64,
    pub fps: f64,
    /// Encoded output position in milliseconds
    pub out_time_ms: i64,
    /// Output position as HH:MM:SS.micro
    pub out_time: String,
    /// Multiple of realtime
    pub speed: f64,
    /// Set once FFmpeg reports `progress=end`
    pub is_complete: bool,
}
