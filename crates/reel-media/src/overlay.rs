//! Overlay Composer: timed title and caption clips.
//!
//! The hook becomes a title pinned near the top of the frame. The body is
//! split into fixed-size word chunks that are spread evenly over the
//! narration, each slightly overlapping the next so captions never blink.
//! Every clip is rendered to a `drawtext` filter fragment through a
//! [`TextRenderer`]; a clip whose primary styling cannot be rendered is
//! retried once with the fallback style and dropped if that fails too.

use reel_models::{FrameSize, OverlayClip, OverlayRole, StyleTier};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Composer layout and pacing knobs.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Longest title in characters, ellipsis included
    pub title_char_budget: usize,
    /// Longest time the title stays on screen
    pub title_max_secs: f64,
    pub title_font_size: u32,
    /// Title top edge as a fraction of frame height
    pub title_top_fraction: f64,
    pub title_min_top_px: u32,
    pub caption_font_size: u32,
    pub caption_chunk_words: usize,
    pub max_caption_chunks: usize,
    /// Caption block bottom margin as a fraction of frame height
    pub caption_bottom_fraction: f64,
    /// Lead-in before the first caption: `min(fraction * duration, max)`
    pub lead_in_fraction: f64,
    pub lead_in_max_secs: f64,
    /// Caption-free tail at the end of the timeline
    pub trailing_buffer_secs: f64,
    /// Extra time each caption lingers: `min(max, fraction * slot)`
    pub overlap_max_secs: f64,
    pub overlap_fraction: f64,
    /// Share of the frame width text may occupy
    pub text_width_fraction: f64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            title_char_budget: 80,
            title_max_secs: 60.0,
            title_font_size: 72,
            title_top_fraction: 0.04,
            title_min_top_px: 50,
            caption_font_size: 42,
            caption_chunk_words: 5,
            max_caption_chunks: 40,
            caption_bottom_fraction: 0.08,
            lead_in_fraction: 0.05,
            lead_in_max_secs: 1.0,
            trailing_buffer_secs: 0.3,
            overlap_max_secs: 0.15,
            overlap_fraction: 0.25,
            text_width_fraction: 0.9,
        }
    }
}

/// Placement and timing of one block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement<'a> {
    /// Display text; lines separated by `\n`
    pub text: &'a str,
    pub font_size: u32,
    /// Top edge in output pixels (horizontally centered)
    pub y: u32,
    pub start: f64,
    pub end: f64,
}

/// Turns a placed text block into an encoder filter fragment.
pub trait TextRenderer: Send + Sync {
    fn render(&self, placement: &TextPlacement<'_>, tier: StyleTier) -> MediaResult<String>;
}

/// [`TextRenderer`] producing FFmpeg `drawtext` filters.
///
/// The primary tier needs a font file and draws a black border; the fallback
/// tier uses FFmpeg's default font without styling.
#[derive(Debug, Clone, Default)]
pub struct DrawtextRenderer {
    font_path: Option<PathBuf>,
}

impl DrawtextRenderer {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self { font_path }
    }
}

impl TextRenderer for DrawtextRenderer {
    fn render(&self, placement: &TextPlacement<'_>, tier: StyleTier) -> MediaResult<String> {
        let text = escape_drawtext(placement.text);
        if text.trim().is_empty() {
            return Err(MediaError::text_render("nothing to draw"));
        }

        let style = match tier {
            StyleTier::Primary => {
                let font = self
                    .font_path
                    .as_ref()
                    .ok_or_else(|| MediaError::text_render("no font file configured"))?;
                if !font.is_file() {
                    return Err(MediaError::text_render(format!(
                        "font file not found: {}",
                        font.display()
                    )));
                }
                format!(
                    "fontfile='{}':borderw=3:bordercolor=black:",
                    escape_filter_path(&font.to_string_lossy())
                )
            }
            StyleTier::Fallback => String::new(),
        };

        Ok(format!(
            "drawtext={style}text='{text}':expansion=none:fontsize={size}:fontcolor=white:\
             line_spacing={spacing}:x=(w-text_w)/2:y={y}:enable='between(t,{start:.3},{end:.3})'",
            size = placement.font_size,
            spacing = placement.font_size / 4,
            y = placement.y,
            start = placement.start,
            end = placement.end,
        ))
    }
}

/// Escape text for a single-quoted `drawtext` option value.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => {}
            '\'' => escaped.push('\u{2019}'),
            ':' => escaped.push_str("\\:"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a file path for a single-quoted filter option value.
///
/// The graph parser copies quoted text verbatim and the option parser then
/// unescapes it, so `\` and `:` take one backslash. A quote has to leave the
/// quoted run to survive the first pass.
fn escape_filter_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("\\'\\''"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds the overlay clip list for one timeline.
pub struct OverlayComposer<R: TextRenderer> {
    config: ComposerConfig,
    renderer: R,
}

impl<R: TextRenderer> OverlayComposer<R> {
    pub fn new(config: ComposerConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Produce the title and caption clips for a timeline of `duration` seconds.
    ///
    /// Clips come back in non-decreasing start order and every window lies in
    /// `[0, duration]`. Fails only when no clip at all could be rendered.
    pub fn compose(
        &self,
        hook: &str,
        body: &str,
        duration: f64,
        frame: FrameSize,
    ) -> MediaResult<Vec<OverlayClip>> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MediaError::composition_failed(format!(
                "timeline duration must be positive, got {duration}"
            )));
        }

        let mut clips = Vec::new();

        let title = truncate_with_ellipsis(hook.trim(), self.config.title_char_budget);
        if !title.is_empty() {
            let top = ((frame.height as f64 * self.config.title_top_fraction).round() as u32)
                .max(self.config.title_min_top_px);
            let end = self.config.title_max_secs.min(duration);
            if let Some(clip) = self.render_clip(OverlayRole::Title, title, self.config.title_font_size, top, 0.0, end, frame)
            {
                clips.push(clip);
            }
        }

        let chunks = self.caption_chunks(body);
        if !chunks.is_empty() {
            let windows = caption_windows(&self.config, chunks.len(), duration);
            for (chunk, (start, end)) in chunks.into_iter().zip(windows) {
                let lines = wrap_words(&chunk, max_line_chars(&self.config, frame, self.config.caption_font_size)).len();
                let block = lines as u32 * line_height(self.config.caption_font_size);
                let margin = (frame.height as f64 * self.config.caption_bottom_fraction).round() as u32;
                let top = frame.height.saturating_sub(margin).saturating_sub(block);
                if let Some(clip) =
                    self.render_clip(OverlayRole::Caption, chunk, self.config.caption_font_size, top, start, end, frame)
                {
                    clips.push(clip);
                }
            }
        }

        if clips.is_empty() {
            return Err(MediaError::composition_failed(
                "no overlay could be rendered for this request",
            ));
        }

        debug!(
            clips = clips.len(),
            fallback = clips.iter().filter(|c| c.style_tier == StyleTier::Fallback).count(),
            "overlays composed"
        );
        Ok(clips)
    }

    /// Body words grouped into chunks, capped at `max_caption_chunks`.
    fn caption_chunks(&self, body: &str) -> Vec<String> {
        let words: Vec<&str> = body.split_whitespace().collect();
        words
            .chunks(self.config.caption_chunk_words.max(1))
            .take(self.config.max_caption_chunks)
            .map(|chunk| chunk.join(" "))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn render_clip(
        &self,
        role: OverlayRole,
        text: String,
        font_size: u32,
        top: u32,
        start: f64,
        end: f64,
        frame: FrameSize,
    ) -> Option<OverlayClip> {
        let display = wrap_words(&text, max_line_chars(&self.config, frame, font_size)).join("\n");
        let placement = TextPlacement {
            text: &display,
            font_size,
            y: top,
            start,
            end,
        };

        let mut tier = StyleTier::Primary;
        let filter = match self.renderer.render(&placement, tier) {
            Ok(filter) => filter,
            Err(primary) => {
                warn!(role = ?role, error = %primary, "primary text style failed, retrying with fallback");
                tier = StyleTier::Fallback;
                match self.renderer.render(&placement, tier) {
                    Ok(filter) => filter,
                    Err(fallback) => {
                        warn!(role = ?role, text = %text, error = %fallback, "dropping overlay");
                        return None;
                    }
                }
            }
        };

        Some(OverlayClip {
            role,
            text,
            start_offset: start,
            duration: end - start,
            vertical_position: top,
            style_tier: tier,
            filter,
        })
    }
}

/// Even caption slots between the lead-in and the trailing buffer.
fn caption_windows(config: &ComposerConfig, count: usize, duration: f64) -> Vec<(f64, f64)> {
    let mut lead_in = (config.lead_in_fraction * duration).min(config.lead_in_max_secs);
    let mut window_end = duration - config.trailing_buffer_secs;
    if window_end <= lead_in {
        // Too short for the padding; use the whole timeline
        lead_in = 0.0;
        window_end = duration;
    }

    let slot = (window_end - lead_in) / count as f64;
    let overlap = config.overlap_max_secs.min(config.overlap_fraction * slot);

    (0..count)
        .map(|i| {
            let start = lead_in + slot * i as f64;
            let end = (start + slot + overlap).min(duration);
            (start, end)
        })
        .collect()
}

/// Cut `text` to at most `budget` characters, ending in `...` when cut.
fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let keep = budget.saturating_sub(3);
    let head: String = text.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}

fn line_height(font_size: u32) -> u32 {
    font_size + font_size / 4
}

/// Characters per line that fit the frame at `font_size`.
fn max_line_chars(config: &ComposerConfig, frame: FrameSize, font_size: u32) -> usize {
    // Average glyph advance of a bold sans face is a little over half the size
    let usable = frame.width as f64 * config.text_width_fraction;
    ((usable / (font_size.max(1) as f64 * 0.55)).floor() as usize).max(8)
}

/// Greedy word wrap; over-long words get a line of their own.
fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
