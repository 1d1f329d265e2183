//! Deliverable file names and storage keys.

use reel_models::JobId;

/// Longest sanitized name, in characters.
pub const MAX_NAME_CHARS: usize = 60;

const FALLBACK_NAME: &str = "render";

/// Reduce free text to a filesystem- and URL-safe name.
///
/// Keeps ASCII letters and digits, spaces, hyphens and underscores, caps the
/// result at [`MAX_NAME_CHARS`] and turns spaces into underscores. Text with
/// nothing usable becomes `render`.
pub fn sanitize_filename(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let capped: String = kept.trim().chars().take(MAX_NAME_CHARS).collect();
    let name = capped.trim_end().replace(' ', "_");

    if name.chars().all(|c| c == '_' || c == '-') {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// `<jobId>_<sanitized hook>.mp4`
pub fn output_file_name(job_id: &JobId, hook: &str) -> String {
    format!("{}_{}.mp4", job_id, sanitize_filename(hook))
}

/// Storage key for an uploaded render.
pub fn render_key(job_id: &JobId, file_name: &str) -> String {
    format!("renders/{}/{}", job_id, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_replaces() {
        assert_eq!(sanitize_filename("Why I left: a story!"), "Why_I_left_a_story");
        assert_eq!(sanitize_filename("  keep-this_one  "), "keep-this_one");
        assert_eq!(sanitize_filename("café ☕ time"), "caf__time");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let name = sanitize_filename(&"word ".repeat(30));
        assert!(name.chars().count() <= MAX_NAME_CHARS);
        assert!(!name.ends_with('_'));
    }

    #[test]
    fn test_sanitize_fallback() {
        assert_eq!(sanitize_filename("?!?"), "render");
        assert_eq!(sanitize_filename(""), "render");
        assert_eq!(sanitize_filename("   "), "render");
    }

    #[test]
    fn test_names_and_keys() {
        let job = JobId::from_string("abc");
        let file = output_file_name(&job, "Test hook");
        assert_eq!(file, "abc_Test_hook.mp4");
        assert_eq!(render_key(&job, &file), "renders/abc/abc_Test_hook.mp4");
    }
}
