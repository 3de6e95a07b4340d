//! Suno API Data Structures

use serde::Deserialize;

use crate::types::GeneratedAudio;

/// Remote-side clip status.
///
/// `Streaming` counts as success: the audio URL is already usable while the
/// remote side keeps encoding the tail of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    Submitted,
    Queued,
    Pending,
    Started,
    Streaming,
    Complete,
    Error,
    #[serde(other)]
    Unknown,
}

impl ClipStatus {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Streaming | Self::Complete)
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Streaming => "streaming",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Raw clip as returned by the feed, clip, and generate endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClip {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub status: ClipStatus,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub metadata: ClipMetadata,
}

/// Nested clip metadata. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClipMetadata {
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub gpt_description_prompt: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl From<RawClip> for GeneratedAudio {
    fn from(clip: RawClip) -> Self {
        Self {
            id: clip.id,
            title: clip.title,
            text: clip.metadata.prompt.as_deref().map(strip_blank_lines),
            audio_url: clip.audio_url,
            video_url: clip.video_url,
            image_url: clip.image_url,
            created_at: clip.created_at,
            model: clip.model_name,
            status: clip.status.as_str().to_string(),
            tags: clip.metadata.tags,
            description: clip.metadata.gpt_description_prompt,
            duration: clip.metadata.duration,
            error_message: clip.metadata.error_message,
        }
    }
}

/// Drop lines that are empty after trimming, rejoin with a single newline.
///
/// The remote side pads lyrics with blank separator lines; existing
/// consumers expect them stripped.
fn strip_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Response of `POST /api/generate/v2/`.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub clips: Vec<RawClip>,
}

/// Clerk `GET /v1/client` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ClerkClientEnvelope {
    pub response: Option<ClerkClientData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClerkClientData {
    #[serde(default)]
    pub last_active_session_id: Option<String>,
    #[serde(default)]
    pub sessions: Vec<ClerkSession>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClerkSession {
    pub id: String,
}

/// Clerk `POST /v1/client/sessions/{id}/tokens` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ClerkTokenResponse {
    pub jwt: String,
}

/// Raw `GET /api/billing/info/` response.
#[derive(Debug, Deserialize)]
pub(crate) struct BillingInfo {
    pub total_credits_left: f64,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub monthly_limit: f64,
    #[serde(default)]
    pub monthly_usage: f64,
}

/// Normalized account usage.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditsInfo {
    pub credits_left: f64,
    pub period: Option<String>,
    pub monthly_limit: f64,
    pub monthly_usage: f64,
}

impl From<BillingInfo> for CreditsInfo {
    fn from(raw: BillingInfo) -> Self {
        Self {
            credits_left: raw.total_credits_left,
            period: raw.period,
            monthly_limit: raw.monthly_limit,
            monthly_usage: raw.monthly_usage,
        }
    }
}

/// Response of `POST /api/generate/lyrics/`.
#[derive(Debug, Deserialize)]
pub(crate) struct LyricsSubmitResponse {
    pub id: String,
}

/// Raw lyrics job as returned by `GET /api/generate/lyrics/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct LyricsJob {
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Completed lyrics generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsResult {
    pub title: String,
    pub text: String,
}

/// Options for description-mode generation (`gpt_description_prompt`).
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Free-text description of the desired song.
    pub prompt: String,
    /// Generate without vocals. Default `false`.
    pub make_instrumental: bool,
    /// Generation model, defaults to [`super::DEFAULT_MODEL`].
    pub model: Option<String>,
    /// Poll the feed until the clips reach a terminal state. Default `false`.
    pub wait_audio: bool,
}

impl GenerateOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            make_instrumental: false,
            model: None,
            wait_audio: false,
        }
    }
}

/// Options for custom-mode generation (caller supplies the lyrics).
#[derive(Debug, Clone)]
pub struct CustomGenerateOptions {
    /// Full lyrics text.
    pub prompt: String,
    /// Style tags, comma separated.
    pub tags: String,
    pub title: String,
    /// Styles the model should avoid. Default `None`.
    pub negative_tags: Option<String>,
    /// Generate without vocals. Default `false`.
    pub make_instrumental: bool,
    /// Generation model, defaults to [`super::DEFAULT_MODEL`].
    pub model: Option<String>,
    /// Poll the feed until the clips reach a terminal state. Default `false`.
    pub wait_audio: bool,
}

impl CustomGenerateOptions {
    pub fn new(prompt: impl Into<String>, tags: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tags: tags.into(),
            title: title.into(),
            negative_tags: None,
            make_instrumental: false,
            model: None,
            wait_audio: false,
        }
    }
}

/// Options for extending an existing clip.
#[derive(Debug, Clone)]
pub struct ExtendOptions {
    /// Clip to continue from.
    pub audio_id: String,
    /// Timestamp (seconds) to continue from. Default: the end of the clip.
    pub continue_at: Option<f64>,
    /// Additional lyrics for the extension. Default `None`.
    pub prompt: Option<String>,
    pub tags: Option<String>,
    pub title: Option<String>,
    /// Generation model, defaults to [`super::DEFAULT_MODEL`].
    pub model: Option<String>,
}

impl ExtendOptions {
    pub fn new(audio_id: impl Into<String>) -> Self {
        Self {
            audio_id: audio_id.into(),
            continue_at: None,
            prompt: None,
            tags: None,
            title: None,
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_blank_lines() {
        assert_eq!(strip_blank_lines("line1\n\n  \nline2\n"), "line1\nline2");
    }

    #[test]
    fn test_strip_blank_lines_keeps_content_untouched() {
        assert_eq!(strip_blank_lines("  a  \nb"), "  a  \nb");
    }

    #[test]
    fn test_strip_blank_lines_all_blank() {
        assert_eq!(strip_blank_lines("\n \n\t\n"), "");
    }

    #[test]
    fn test_clip_status_classification() {
        assert!(ClipStatus::Complete.is_success());
        assert!(ClipStatus::Streaming.is_success());
        assert!(ClipStatus::Error.is_failure());
        assert!(!ClipStatus::Queued.is_success());
        assert!(!ClipStatus::Queued.is_failure());
        assert!(!ClipStatus::Unknown.is_success());
        assert!(!ClipStatus::Unknown.is_failure());
    }

    #[test]
    fn test_clip_status_deserialize_unknown_variant() {
        let status: ClipStatus = serde_json::from_str(r#""some_future_state""#).unwrap();
        assert_eq!(status, ClipStatus::Unknown);
    }

    #[test]
    fn test_raw_clip_deserialize_minimal() {
        let json = r#"{"id": "clip_1", "status": "queued"}"#;
        let clip: RawClip = serde_json::from_str(json).unwrap();
        assert_eq!(clip.id, "clip_1");
        assert_eq!(clip.status, ClipStatus::Queued);
        assert!(clip.audio_url.is_none());
        assert!(clip.metadata.prompt.is_none());
    }

    #[test]
    fn test_raw_clip_normalization_flattens_metadata() {
        let json = r#"{
            "id": "clip_2",
            "title": "Rainfall",
            "status": "complete",
            "audio_url": "https://cdn.suno.ai/clip_2.mp3",
            "model_name": "chirp-v3-5",
            "metadata": {
                "tags": "synthwave",
                "prompt": "verse one\n\n  \nchorus\n",
                "duration": 121.5
            }
        }"#;
        let clip: RawClip = serde_json::from_str(json).unwrap();
        let record: GeneratedAudio = clip.into();
        assert_eq!(record.id, "clip_2");
        assert_eq!(record.status, "complete");
        assert_eq!(record.text.as_deref(), Some("verse one\nchorus"));
        assert_eq!(record.tags.as_deref(), Some("synthwave"));
        assert_eq!(record.duration, Some(121.5));
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_clerk_client_envelope_deserialize() {
        let json = r#"{"response": {"last_active_session_id": "sess_1", "sessions": [{"id": "sess_1"}]}}"#;
        let envelope: ClerkClientEnvelope = serde_json::from_str(json).unwrap();
        let data = envelope.response.unwrap();
        assert_eq!(data.last_active_session_id.as_deref(), Some("sess_1"));
        assert_eq!(data.sessions.len(), 1);
    }

    #[test]
    fn test_billing_info_normalization() {
        let json = r#"{"total_credits_left": 42.5, "period": "month", "monthly_limit": 500.0, "monthly_usage": 457.5}"#;
        let raw: BillingInfo = serde_json::from_str(json).unwrap();
        let credits: CreditsInfo = raw.into();
        assert_eq!(credits.credits_left, 42.5);
        assert_eq!(credits.period.as_deref(), Some("month"));
        assert_eq!(credits.monthly_usage, 457.5);
    }
}
