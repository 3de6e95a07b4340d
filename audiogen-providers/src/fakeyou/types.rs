//! FakeYou API Data Structures

use std::time::Duration;

use serde::Deserialize;

use crate::types::GeneratedAudio;

/// Remote-side inference job state.
///
/// `AttemptFailed` is a retried attempt, not a terminal state; the remote
/// scheduler keeps working on the job. Unknown states are treated as
/// non-terminal so the poll loop keeps observing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Started,
    AttemptFailed,
    CompleteSuccess,
    CompleteFailure,
    Dead,
    #[serde(other)]
    Unknown,
}

impl JobState {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::CompleteSuccess)
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::CompleteFailure | Self::Dead)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::AttemptFailed => "attempt_failed",
            Self::CompleteSuccess => "complete_success",
            Self::CompleteFailure => "complete_failure",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

/// Selectable voice model descriptor, as returned by `GET /tts/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsModel {
    pub model_token: String,
    pub title: String,
    #[serde(default)]
    pub ietf_language_tag: String,
    #[serde(default)]
    pub ietf_primary_language_subtag: String,
    #[serde(default)]
    pub creator_display_name: Option<String>,
    #[serde(default)]
    pub user_ratings: Option<UserRatings>,
}

/// Rating aggregates attached to a voice model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRatings {
    #[serde(default)]
    pub positive_count: u64,
    #[serde(default)]
    pub negative_count: u64,
    #[serde(default)]
    pub total_count: u64,
}

/// Envelope fields shared by every FakeYou response: a `success` flag and,
/// on failure, a reason. A failure body carries nothing else, so the
/// endpoint-specific payload is decoded separately and only from bodies
/// that report success.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeStatus {
    pub success: bool,
    #[serde(default)]
    pub error_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelListPayload {
    pub models: Vec<TtsModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InferenceJobPayload {
    pub inference_job_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TtsJobPayload {
    pub state: TtsJobState,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoiceConversionJobPayload {
    pub state: VoiceConversionJobState,
}

/// Raw TTS job state as returned by `GET /tts/job/{token}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsJobState {
    pub job_token: String,
    pub status: JobState,
    #[serde(default)]
    pub maybe_public_bucket_wav_audio_path: Option<String>,
    #[serde(default)]
    pub maybe_extra_status_description: Option<String>,
    #[serde(default)]
    pub raw_inference_text: Option<String>,
    #[serde(default)]
    pub tts_model_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TtsJobState {
    /// Flatten into the service-agnostic record. The bucket-relative audio
    /// path, when present, is prefixed with the public storage base URL.
    pub(crate) fn into_generated(self, storage_base_url: &str) -> GeneratedAudio {
        GeneratedAudio {
            id: self.job_token,
            title: self.title,
            text: self.raw_inference_text,
            audio_url: self
                .maybe_public_bucket_wav_audio_path
                .map(|path| format!("{storage_base_url}{path}")),
            video_url: None,
            image_url: None,
            created_at: self.created_at,
            model: self.tts_model_token,
            status: self.status.as_str().to_string(),
            tags: None,
            description: None,
            duration: None,
            error_message: self.maybe_extra_status_description,
        }
    }
}

/// Raw voice conversion job state as returned by
/// `GET /v1/model_inference/job_status/{token}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConversionJobState {
    pub job_token: String,
    pub status: JobState,
    #[serde(default)]
    pub maybe_public_bucket_media_path: Option<String>,
    #[serde(default)]
    pub maybe_extra_status_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl VoiceConversionJobState {
    pub(crate) fn into_generated(self, storage_base_url: &str) -> GeneratedAudio {
        GeneratedAudio {
            id: self.job_token,
            title: None,
            text: None,
            audio_url: self
                .maybe_public_bucket_media_path
                .map(|path| format!("{storage_base_url}{path}")),
            video_url: None,
            image_url: None,
            created_at: self.created_at,
            model: None,
            status: self.status.as_str().to_string(),
            tags: None,
            description: None,
            duration: None,
            error_message: self.maybe_extra_status_description,
        }
    }
}

/// Options for text-to-speech inference.
#[derive(Debug, Clone)]
pub struct TtsOptions {
    /// Fixed interval between job polls. Default 1 second. The loop has no
    /// overall deadline; it runs until the job itself terminates.
    pub poll_interval: Duration,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Options for voice-to-voice conversion.
#[derive(Debug, Clone)]
pub struct VoiceConversionOptions {
    /// Fixed interval between job polls. Default 1 second.
    pub poll_interval: Duration,
    /// File name reported in the multipart upload. Default `source.wav`.
    pub file_name: String,
    /// MIME type of the uploaded audio. Default `audio/wav`.
    pub mime_type: String,
}

impl Default for VoiceConversionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            file_name: "source.wav".to_string(),
            mime_type: "audio/wav".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_classification() {
        assert!(JobState::CompleteSuccess.is_success());
        assert!(JobState::CompleteFailure.is_failure());
        assert!(JobState::Dead.is_failure());
        assert!(!JobState::Pending.is_success());
        assert!(!JobState::AttemptFailed.is_failure());
        assert!(!JobState::Unknown.is_success());
        assert!(!JobState::Unknown.is_failure());
    }

    #[test]
    fn test_job_state_deserialize() {
        let state: JobState = serde_json::from_str(r#""attempt_failed""#).unwrap();
        assert_eq!(state, JobState::AttemptFailed);
        let state: JobState = serde_json::from_str(r#""some_new_state""#).unwrap();
        assert_eq!(state, JobState::Unknown);
    }

    #[test]
    fn test_model_deserialize() {
        let json = r#"{
            "model_token": "TM:abc123",
            "title": "Mario (SM64)",
            "ietf_language_tag": "en-US",
            "ietf_primary_language_subtag": "en",
            "creator_display_name": "someone",
            "user_ratings": {"positive_count": 10, "negative_count": 2, "total_count": 12}
        }"#;
        let model: TtsModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.model_token, "TM:abc123");
        assert_eq!(model.ietf_language_tag, "en-US");
        assert_eq!(model.user_ratings.unwrap().positive_count, 10);
    }

    #[test]
    fn test_model_deserialize_minimal() {
        let json = r#"{"model_token": "TM:x", "title": "Voice"}"#;
        let model: TtsModel = serde_json::from_str(json).unwrap();
        assert!(model.ietf_language_tag.is_empty());
        assert!(model.user_ratings.is_none());
    }

    #[test]
    fn test_payload_decodes_alongside_envelope_fields() {
        let json = r#"{"success": true, "inference_job_token": "JTINF:1"}"#;
        let status: EnvelopeStatus = serde_json::from_str(json).unwrap();
        assert!(status.success);
        let payload: InferenceJobPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.inference_job_token, "JTINF:1");
    }

    #[test]
    fn test_envelope_status_decodes_failure_without_payload() {
        // Failure bodies have no payload fields; the status must still decode.
        let json = r#"{"success": false, "error_reason": "rate limited"}"#;
        let status: EnvelopeStatus = serde_json::from_str(json).unwrap();
        assert!(!status.success);
        assert_eq!(status.error_reason.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_tts_state_into_generated_prefixes_storage() {
        let state = TtsJobState {
            job_token: "JTINF:1".to_string(),
            status: JobState::CompleteSuccess,
            maybe_public_bucket_wav_audio_path: Some("/tts/out.wav".to_string()),
            maybe_extra_status_description: None,
            raw_inference_text: Some("hello".to_string()),
            tts_model_token: Some("TM:abc".to_string()),
            title: None,
            created_at: None,
        };
        let record = state.into_generated("https://storage.googleapis.com/vocodes-public");
        assert_eq!(
            record.audio_url.as_deref(),
            Some("https://storage.googleapis.com/vocodes-public/tts/out.wav")
        );
        assert_eq!(record.status, "complete_success");
        assert_eq!(record.text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_tts_state_into_generated_passes_nulls_through() {
        let json = r#"{"job_token": "JTINF:2", "status": "pending"}"#;
        let state: TtsJobState = serde_json::from_str(json).unwrap();
        let record = state.into_generated("https://cdn.test");
        assert!(record.audio_url.is_none());
        assert!(record.error_message.is_none());
        assert_eq!(record.status, "pending");
    }
}
