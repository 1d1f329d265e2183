//! The composed, time-bounded render unit.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FrameGeometry, MediaAsset, OverlayClip};

/// Default hard cap on output length in seconds.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 60.0;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("Timeline duration must be positive, got {0:.3}s")]
    NonPositiveDuration(f64),

    #[error("Overlay {index} ({start:.3}s + {duration:.3}s) exceeds timeline of {timeline:.3}s")]
    ClipOutOfBounds {
        index: usize,
        start: f64,
        duration: f64,
        timeline: f64,
    },

    #[error("Overlay {0} starts before the overlay preceding it")]
    OutOfOrder(usize),

    #[error("Asset {0} has not been verified")]
    UnverifiedAsset(String),
}

/// Background + overlays + narration, truncated to a single duration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Timeline {
    pub background: MediaAsset,
    pub audio: MediaAsset,
    pub overlays: Vec<OverlayClip>,
    pub geometry: FrameGeometry,
    /// Seconds; every component window is a subset of `[0, duration]`
    pub duration: f64,
    /// Narration speed factor (`None` keeps the original speed)
    pub audio_tempo: Option<f64>,
}

impl Timeline {
    /// Build a timeline, checking the ordering and containment invariants.
    pub fn new(
        background: MediaAsset,
        audio: MediaAsset,
        overlays: Vec<OverlayClip>,
        geometry: FrameGeometry,
        duration: f64,
        audio_tempo: Option<f64>,
    ) -> Result<Self, TimelineError> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(TimelineError::NonPositiveDuration(duration));
        }
        for asset in [&background, &audio] {
            if !asset.is_verified() {
                return Err(TimelineError::UnverifiedAsset(asset.source_uri().to_string()));
            }
        }

        let mut previous_start = 0.0_f64;
        for (index, clip) in overlays.iter().enumerate() {
            if !clip.fits_within(duration) {
                return Err(TimelineError::ClipOutOfBounds {
                    index,
                    start: clip.start_offset,
                    duration: clip.duration,
                    timeline: duration,
                });
            }
            if clip.start_offset < previous_start {
                return Err(TimelineError::OutOfOrder(index));
            }
            previous_start = clip.start_offset;
        }

        Ok(Self {
            background,
            audio,
            overlays,
            geometry,
            duration,
            audio_tempo,
        })
    }
}

/// Resolve the timeline length: the shortest of narration, background and cap.
///
/// With a tempo factor the narration plays for `audio / tempo` seconds.
pub fn resolve_duration(audio_secs: f64, background_secs: f64, cap_secs: f64, tempo: Option<f64>) -> f64 {
    let audio_secs = match tempo {
        Some(t) if t > 0.0 => audio_secs / t,
        _ => audio_secs,
    };
    audio_secs.min(background_secs).min(cap_secs)
}
