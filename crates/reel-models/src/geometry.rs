//! Frame sizes and normalized geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Full-HD portrait output (1080x1920).
    pub const PORTRAIT_HD: FrameSize = FrameSize {
        width: 1080,
        height: 1920,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width / height, or `None` for a degenerate frame.
    pub fn aspect(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::PORTRAIT_HD
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Scale/crop plan that brings a background clip to the target frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameGeometry {
    pub source_width: u32,
    pub source_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    /// Uniform scale applied to the source (width axis for pure resizes)
    pub scale_factor: f64,
    /// Frame size after scaling, before cropping
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Top-left corner of the crop window inside the scaled frame
    pub crop_x: u32,
    pub crop_y: u32,
    /// False when the source already had the target aspect ratio
    pub cropped: bool,
}

impl FrameGeometry {
    /// Aspect ratio of the frame this geometry produces.
    pub fn output_aspect(&self) -> f64 {
        if self.cropped {
            self.target_width as f64 / self.target_height as f64
        } else {
            self.scaled_width as f64 / self.scaled_height as f64
        }
    }

    pub fn is_pure_resize(&self) -> bool {
        !self.cropped && self.crop_x == 0 && self.crop_y == 0
    }

    /// FFmpeg filter chain fragment implementing this geometry.
    pub fn filter(&self) -> String {
        if self.cropped {
            format!(
                "scale={}:{},crop={}:{}:{}:{},setsar=1",
                self.scaled_width,
                self.scaled_height,
                self.target_width,
                self.target_height,
                self.crop_x,
                self.crop_y
            )
        } else {
            format!("scale={}:{},setsar=1", self.target_width, self.target_height)
        }
    }
}
