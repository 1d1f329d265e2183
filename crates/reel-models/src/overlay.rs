//! Text overlay clips.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing clip windows against the timeline.
pub const TIME_EPSILON: f64 = 1e-6;

/// Font rendering attempt an overlay was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StyleTier {
    /// Configured font file with border styling
    #[default]
    Primary,
    /// Encoder default font, no extra styling
    Fallback,
}

impl StyleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTier::Primary => "primary",
            StyleTier::Fallback => "fallback",
        }
    }
}

impl fmt::Display for StyleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the template an overlay fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverlayRole {
    /// Hook text near the top of the frame
    Title,
    /// Lower-third caption chunk
    Caption,
}

/// One rendered text element on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayClip {
    pub role: OverlayRole,
    pub text: String,
    /// Seconds from the start of the timeline
    pub start_offset: f64,
    /// Seconds on screen
    pub duration: f64,
    /// Top edge of the text block in output pixels
    pub vertical_position: u32,
    pub style_tier: StyleTier,
    /// Encoder filter fragment that draws this clip
    pub filter: String,
}

impl OverlayClip {
    pub fn end_offset(&self) -> f64 {
        self.start_offset + self.duration
    }

    /// Whether the clip's window lies inside `[0, timeline_duration]`.
    pub fn fits_within(&self, timeline_duration: f64) -> bool {
        self.start_offset >= 0.0
            && self.duration >= 0.0
            && self.end_offset() <= timeline_duration + TIME_EPSILON
    }
}
