//! Shared data models for the reelcast render pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Render requests and mood keys
//! - Fetched media assets
//! - Frame geometry
//! - Overlay clips and the composed timeline
//! - Encoding configuration and strategy names
//! - Job identifiers, stages and results

pub mod asset;
pub mod encoding;
pub mod geometry;
pub mod job;
pub mod overlay;
pub mod request;
pub mod result;
pub mod timeline;

// Re-export common types
pub use asset::{MediaAsset, MediaKind};
pub use encoding::{EncodingConfig, EncodingStrategyKind};
pub use geometry::{FrameGeometry, FrameSize};
pub use job::{JobId, JobStage};
pub use overlay::{OverlayClip, OverlayRole, StyleTier};
pub use request::{Mood, RenderRequest};
pub use result::{BatchSummary, RenderResult};
pub use timeline::{resolve_duration, Timeline, TimelineError, DEFAULT_MAX_DURATION_SECS};
