/// Wire types for the studio backend
///
/// One request and one response struct per endpoint. Response fields the
/// backend may omit are `#[serde(default)]` so a missing field decodes to
/// its documented default instead of failing.
use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};

pub const GENERATE_FULL_PATH: &str = "/api/generate/full";
pub const GENERATE_EDIT_PATH: &str = "/api/generate/edit";
pub const GENERATE_SAVE_PATH: &str = "/api/generate/save";
pub const TRAILER_GENERATE_PATH: &str = "/api/trailer/generate";
pub const TRAILER_UPLOAD_PATH: &str = "/api/trailer/upload";

/// Summary used when the prompt field is empty
pub const FALLBACK_TRAILER_SUMMARY: &str = "Arcade browser game trailer.";
/// Placeholder title sent with every trailer render
pub const TRAILER_TITLE: &str = "game-trailer";
pub const TRAILER_DURATION_SECS: u32 = 6;
pub const TRAILER_RESOLUTION: &str = "768P";

pub const UPLOAD_TITLE_PREFIX: &str = "Game Trailer: ";
/// Characters of the summary appended to the upload title prefix
pub const UPLOAD_TITLE_SUMMARY_CHARS: usize = 40;
pub const UPLOAD_PRIVACY: &str = "unlisted";
pub const UPLOAD_TAG: &str = "#shorts";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineRequest {
    pub prompt: String,
    pub html: String,
}

/// Response of both the full-generation and refine endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedPage {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub html: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveResponse {
    /// Accept the record only when the backend confirmed it and said where
    /// the saved page lives; otherwise reject with `error`, then `message`.
    pub fn into_result(self) -> Result<Self> {
        if !self.ok {
            let message = self
                .error
                .clone()
                .or_else(|| self.message.clone())
                .unwrap_or_else(|| "Save failed".to_string());
            return Err(StudioError::Rejected(message));
        }
        if self.path.trim().is_empty() {
            return Err(StudioError::Rejected("Save returned no path".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailerRequest {
    pub summary: String,
    pub title: String,
    pub duration: u32,
    pub resolution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TrailerRequest {
    /// Trailer request with the fixed title, duration and resolution.
    /// A blank summary falls back to [`FALLBACK_TRAILER_SUMMARY`].
    pub fn for_summary(summary: &str) -> Self {
        let summary = summary.trim();
        let summary = if summary.is_empty() {
            FALLBACK_TRAILER_SUMMARY
        } else {
            summary
        };
        Self {
            summary: summary.to_string(),
            title: TRAILER_TITLE.to_string(),
            duration: TRAILER_DURATION_SECS,
            resolution: TRAILER_RESOLUTION.to_string(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrailerResponse {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRequest {
    pub filename: String,
    pub title: String,
    pub description: String,
    pub privacy: String,
}

impl UploadRequest {
    /// Build the upload for a rendered trailer.
    ///
    /// Title is the fixed prefix plus the first 40 characters of the
    /// summary; the description carries the summary, the rendered video URL
    /// when known, and the shorts tag.
    pub fn for_trailer(trailer: &TrailerResponse, summary: &str) -> Self {
        let head: String = summary.chars().take(UPLOAD_TITLE_SUMMARY_CHARS).collect();
        let mut description = summary.to_string();
        if !trailer.video_url.is_empty() {
            description.push_str("\n\n");
            description.push_str(&trailer.video_url);
        }
        description.push_str("\n\n");
        description.push_str(UPLOAD_TAG);

        Self {
            filename: trailer.filename.clone(),
            title: format!("{UPLOAD_TITLE_PREFIX}{head}"),
            description,
            privacy: UPLOAD_PRIVACY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub watch_url: String,
    #[serde(default)]
    pub video_id: Option<String>,
}
