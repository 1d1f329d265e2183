//! Render request input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Mood key into the background-clip catalog.
///
/// Kept as an open string so catalogs loaded from disk may define their own
/// moods; whether a mood exists is decided by the catalog, not by parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Mood(pub String);

impl Mood {
    /// Create a mood key, normalized to trimmed lowercase.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Mood {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A request to render one narrated short.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct RenderRequest {
    /// Short title text shown at the top of the frame
    #[validate(length(min = 1, max = 500))]
    pub hook: String,

    /// Long text broken into timed captions
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub body: String,

    /// Background mood
    pub mood: Mood,

    /// Narration audio location
    #[serde(alias = "narration_source")]
    #[validate(url, custom(function = "validate_http_scheme"))]
    pub narration_url: String,
}

/// Only remote narration is accepted from callers; local paths are reserved
/// for catalog entries.
fn validate_http_scheme(url: &str) -> Result<(), ValidationError> {
    let scheme = url.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
    match scheme.as_deref() {
        Some("http") | Some("https") => Ok(()),
        _ => Err(ValidationError::new("http_scheme")
            .with_message("narration_url must be an http(s) URL".into())),
    }
}

impl RenderRequest {
    pub fn new(
        hook: impl Into<String>,
        body: impl Into<String>,
        mood: impl Into<Mood>,
        narration_url: impl Into<String>,
    ) -> Self {
        Self {
            hook: hook.into(),
            body: body.into(),
            mood: mood.into(),
            narration_url: narration_url.into(),
        }
    }
}
