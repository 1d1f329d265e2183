//! The three rungs of the encoder ladder.

use reel_models::{EncodingConfig, EncodingStrategyKind, Timeline};
use std::path::{Path, PathBuf};

use super::diagnostics::confirm_audio_stream_present;
use crate::command::FfmpegCommand;

/// One way of turning a timeline into a deliverable file.
///
/// A strategy only plans FFmpeg passes; the encoder runs them, checks the
/// output and cleans up. Every pass but the last writes an intermediate that
/// is removed once the attempt finishes.
pub trait EncodeStrategy: Send + Sync {
    fn kind(&self) -> EncodingStrategyKind;

    /// FFmpeg invocations to run in order; the last one writes `output`.
    fn plan(&self, timeline: &Timeline, config: &EncodingConfig, output: &Path) -> Vec<FfmpegCommand>;

    /// Extra acceptance check on the final pass's diagnostics.
    fn accept(&self, _diagnostics: &str) -> Result<(), String> {
        Ok(())
    }
}

/// The default ladder: conservative, minimal, direct mux.
pub fn default_strategies() -> Vec<Box<dyn EncodeStrategy>> {
    vec![Box::new(Conservative), Box::new(Minimal), Box::new(DirectMux)]
}

/// Background scaled to the target frame with every overlay drawn on top.
fn video_graph(timeline: &Timeline, pix_fmt: &str) -> String {
    let mut chain = vec![timeline.geometry.filter()];
    chain.extend(timeline.overlays.iter().map(|clip| clip.filter.clone()));
    chain.push(format!("format={pix_fmt}"));
    format!("[0:v]{}[v]", chain.join(","))
}

fn tempo_filter(timeline: &Timeline) -> Option<String> {
    timeline
        .audio_tempo
        .filter(|t| (*t - 1.0).abs() > f64::EPSILON)
        .map(|t| format!("atempo={t:.3}"))
}

/// Single pass over background + narration sharing one filter graph.
fn composite_pass(timeline: &Timeline, config: &EncodingConfig, output: &Path) -> FfmpegCommand {
    let mut graph = video_graph(timeline, &config.pix_fmt);
    let audio_map = match tempo_filter(timeline) {
        Some(tempo) => {
            graph.push_str(&format!(";[1:a]{tempo}[a]"));
            "[a]".to_string()
        }
        None => "1:a:0".to_string(),
    };

    FfmpegCommand::new(timeline.background.local_path(), output)
        .duration(timeline.duration)
        .add_input(timeline.audio.local_path())
        .filter_complex(graph)
        .map("[v]")
        .map(audio_map)
}

/// Bounded bitrate, one encoder thread, fast preset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conservative;

impl EncodeStrategy for Conservative {
    fn kind(&self) -> EncodingStrategyKind {
        EncodingStrategyKind::Conservative
    }

    fn plan(&self, timeline: &Timeline, config: &EncodingConfig, output: &Path) -> Vec<FfmpegCommand> {
        let cmd = composite_pass(timeline, config, output)
            .video_codec(&config.codec)
            .preset(&config.preset)
            .video_bitrate(&config.video_bitrate, &config.max_rate, &config.buf_size)
            .threads(1)
            .output_args(config.audio_args())
            .frame_rate(config.fps)
            .output_duration(timeline.duration)
            .faststart();
        vec![cmd]
    }
}

/// Codec and frame rate only; everything else left to FFmpeg defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minimal;

impl EncodeStrategy for Minimal {
    fn kind(&self) -> EncodingStrategyKind {
        EncodingStrategyKind::Minimal
    }

    fn plan(&self, timeline: &Timeline, config: &EncodingConfig, output: &Path) -> Vec<FfmpegCommand> {
        let cmd = composite_pass(timeline, config, output)
            .video_codec(&config.codec)
            .audio_codec(&config.audio_codec)
            .frame_rate(config.fps)
            .output_duration(timeline.duration);
        vec![cmd]
    }
}

/// Video and audio rendered separately, then multiplexed with explicit maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectMux;

impl DirectMux {
    pub fn video_intermediate(output: &Path) -> PathBuf {
        sibling(output, "video.mp4")
    }

    pub fn audio_intermediate(output: &Path) -> PathBuf {
        sibling(output, "audio.wav")
    }
}

fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    output.with_file_name(format!("{stem}.{suffix}"))
}

impl EncodeStrategy for DirectMux {
    fn kind(&self) -> EncodingStrategyKind {
        EncodingStrategyKind::DirectMux
    }

    fn plan(&self, timeline: &Timeline, config: &EncodingConfig, output: &Path) -> Vec<FfmpegCommand> {
        let video_only = Self::video_intermediate(output);
        let audio_only = Self::audio_intermediate(output);

        let video = FfmpegCommand::new(timeline.background.local_path(), &video_only)
            .duration(timeline.duration)
            .filter_complex(video_graph(timeline, &config.pix_fmt))
            .map("[v]")
            .no_audio()
            .video_codec(&config.codec)
            .preset(&config.preset)
            .crf(config.crf)
            .frame_rate(config.fps)
            .output_duration(timeline.duration);

        let mut audio = FfmpegCommand::new(timeline.audio.local_path(), &audio_only).no_video();
        if let Some(tempo) = tempo_filter(timeline) {
            audio = audio.output_arg("-af").output_arg(tempo);
        }
        let audio = audio
            .audio_codec("pcm_s16le")
            .output_duration(timeline.duration);

        // Info level so the stream negotiation can be checked afterwards
        let mux = FfmpegCommand::new(&video_only, output)
            .add_input(&audio_only)
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy")
            .output_args(config.audio_args())
            .output_arg("-shortest")
            .faststart()
            .log_level("info");

        vec![video, audio, mux]
    }

    fn accept(&self, diagnostics: &str) -> Result<(), String> {
        if confirm_audio_stream_present(diagnostics) {
            Ok(())
        } else {
            Err("muxed output has no audio stream".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{FrameGeometry, MediaAsset, MediaKind, OverlayClip, OverlayRole, StyleTier};

    fn timeline(tempo: Option<f64>) -> Timeline {
        let geometry = FrameGeometry {
            source_width: 1920,
            source_height: 1080,
            target_width: 1080,
            target_height: 1920,
            scale_factor: 1920.0 / 1080.0,
            scaled_width: 3414,
            scaled_height: 1920,
            crop_x: 1167,
            crop_y: 0,
            cropped: true,
        };
        let title = OverlayClip {
            role: OverlayRole::Title,
            text: "hook".into(),
            start_offset: 0.0,
            duration: 20.0,
            vertical_position: 77,
            style_tier: StyleTier::Fallback,
            filter: "drawtext=text='hook'".into(),
        };
        Timeline::new(
            MediaAsset::new(MediaKind::Video, "https://x.test/bg.mp4", "/ws/background.mp4").into_verified(),
            MediaAsset::new(MediaKind::Audio, "https://x.test/v.mp3", "/ws/voice.mp3").into_verified(),
            vec![title],
            geometry,
            20.0,
            tempo,
        )
        .unwrap()
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_conservative_bounds_bitrate() {
        let plan = Conservative.plan(&timeline(None), &EncodingConfig::default(), Path::new("/ws/render.mp4"));
        assert_eq!(plan.len(), 1);
        let args = plan[0].build_args();
        assert!(has_pair(&args, "-b:v", "3500k"));
        assert!(has_pair(&args, "-maxrate", "4000k"));
        assert!(has_pair(&args, "-bufsize", "8000k"));
        assert!(has_pair(&args, "-threads", "1"));
        assert!(has_pair(&args, "-preset", "veryfast"));
        assert!(has_pair(&args, "-r", "30"));
        assert!(has_pair(&args, "-map", "1:a:0"));
        assert!(has_pair(
            &args,
            "-filter_complex",
            "[0:v]scale=3414:1920,crop=1080:1920:1167:0,setsar=1,drawtext=text='hook',format=yuv420p[v]"
        ));
    }

    #[test]
    fn test_minimal_pins_codec_and_rate_only() {
        let plan = Minimal.plan(&timeline(None), &EncodingConfig::default(), Path::new("/ws/render.mp4"));
        let args = plan[0].build_args();
        assert!(has_pair(&args, "-c:v", "libx264"));
        assert!(has_pair(&args, "-r", "30"));
        assert!(!args.iter().any(|a| a == "-b:v" || a == "-threads" || a == "-preset"));
    }

    #[test]
    fn test_tempo_is_applied() {
        let plan = Minimal.plan(&timeline(Some(1.25)), &EncodingConfig::default(), Path::new("/ws/render.mp4"));
        let args = plan[0].build_args();
        assert!(has_pair(&args, "-map", "[a]"));
        assert!(args.iter().any(|a| a.ends_with(";[1:a]atempo=1.250[a]")));
    }

    #[test]
    fn test_direct_mux_plan() {
        let output = Path::new("/ws/render.mp4");
        let plan = DirectMux.plan(&timeline(None), &EncodingConfig::default(), output);
        assert_eq!(plan.len(), 3);

        let video = plan[0].build_args();
        assert!(video.iter().any(|a| a == "-an"));
        assert_eq!(plan[0].output_path(), DirectMux::video_intermediate(output));

        let audio = plan[1].build_args();
        assert!(audio.iter().any(|a| a == "-vn"));
        assert!(has_pair(&audio, "-c:a", "pcm_s16le"));
        assert_eq!(plan[1].output_path(), Path::new("/ws/render.audio.wav"));

        let mux = plan[2].build_args();
        assert!(has_pair(&mux, "-map", "0:v:0"));
        assert!(has_pair(&mux, "-map", "1:a:0"));
        assert!(has_pair(&mux, "-c:v", "copy"));
        assert!(has_pair(&mux, "-c:a", "aac"));
        assert_eq!(plan[2].output_path(), output);
    }

    #[test]
    fn test_direct_mux_requires_audio() {
        assert!(DirectMux.accept("Output #0, mp4, to 'x.mp4':\n  Stream #0:0: Video: h264").is_err());
        assert!(DirectMux.accept("Output #0, mp4, to 'x.mp4':\n  Stream #0:1: Audio: aac").is_ok());
    }
}
