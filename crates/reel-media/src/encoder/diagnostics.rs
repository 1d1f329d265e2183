//! Scanning FFmpeg diagnostic output.

/// Codec names that identify an audio stream in a mapping line.
const AUDIO_CODECS: &[&str] = &["aac", "mp3", "pcm_", "opus", "vorbis", "flac", "ac3", "alac"];

/// Whether an FFmpeg log shows an audio stream negotiated into output #0.
///
/// Looks for a `Stream #0:N...: Audio:` line in the `Output #0` section, or a
/// `Stream mapping:` entry targeting output #0 with an audio codec. A final
/// size report of `audio:0kB` overrides both, since it means nothing was
/// written.
pub fn confirm_audio_stream_present(diagnostics: &str) -> bool {
    #[derive(PartialEq)]
    enum Section {
        Other,
        Output0,
        Mapping,
    }

    let mut section = Section::Other;
    let mut negotiated = false;

    for line in diagnostics.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("Output #0") {
            section = Section::Output0;
            continue;
        }
        if trimmed.starts_with("Output #") || trimmed.starts_with("Input #") {
            section = Section::Other;
            continue;
        }
        if trimmed.starts_with("Stream mapping:") {
            section = Section::Mapping;
            continue;
        }

        if let Some(kb) = reported_audio_kb(trimmed) {
            if kb <= 0.0 {
                return false;
            }
        }

        match section {
            Section::Output0 => {
                if trimmed.starts_with("Stream #0:") && trimmed.contains(": Audio:") {
                    negotiated = true;
                } else if !line.starts_with(' ') && !trimmed.is_empty() {
                    section = Section::Other;
                }
            }
            Section::Mapping => {
                if trimmed.starts_with("Stream #") && trimmed.contains("-> #0:") {
                    let lower = trimmed.to_ascii_lowercase();
                    if AUDIO_CODECS.iter().any(|codec| lower.contains(codec)) {
                        negotiated = true;
                    }
                } else if !line.starts_with(' ') && !trimmed.is_empty() {
                    section = Section::Other;
                }
            }
            Section::Other => {}
        }
    }

    negotiated
}

/// Parse the audio size out of FFmpeg's final size report line.
///
/// Older builds print `video:12kB audio:3kB ...`; 6.1+ prefix the line with
/// the muxer context and report `KiB`, e.g. `[out#0/mp4 @ 0x..] video:12KiB audio:0KiB`.
fn reported_audio_kb(line: &str) -> Option<f64> {
    let video_at = line.find("video:")?;
    let after_video = &line[video_at..];
    let rest = &after_video[after_video.find("audio:")? + "audio:".len()..];
    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let unit = &rest[digits.len()..];
    if !(unit.starts_with("kB") || unit.starts_with("KiB")) {
        return None;
    }
    digits.parse().ok()
}

/// Last `max_lines` non-empty lines of a diagnostic log.
pub fn excerpt(diagnostics: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = diagnostics.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}
