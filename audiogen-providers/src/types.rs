//! Service-agnostic result record
//!
//! Both clients reshape their service's raw response into this flattened
//! record, so consumers never have to deal with nested per-service metadata.

use serde::{Deserialize, Serialize};

/// Normalized description of one generated audio item.
///
/// Produced by reshaping a raw Suno clip or a FakeYou job state. Every
/// optional field that the remote side omits or nulls is passed through as
/// `None` rather than treated as an error. The record exists only as a
/// return value; clients never retain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAudio {
    /// Clip id (Suno) or inference job token (FakeYou).
    pub id: String,
    pub title: Option<String>,
    /// Lyrics (Suno, blank lines stripped) or the inference text (FakeYou).
    pub text: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
    /// Generation model name (Suno) or model token (FakeYou).
    pub model: Option<String>,
    /// Last observed service-side status, as reported by the remote API.
    pub status: String,
    pub tags: Option<String>,
    /// Free-text description prompt, when the item was generated from one.
    pub description: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_audio_round_trips_nulls() {
        let json = r#"{
            "id": "clip_1",
            "title": null,
            "text": null,
            "audio_url": null,
            "video_url": null,
            "image_url": null,
            "created_at": null,
            "model": null,
            "status": "queued",
            "tags": null,
            "description": null,
            "duration": null,
            "error_message": null
        }"#;
        let record: GeneratedAudio = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "clip_1");
        assert_eq!(record.status, "queued");
        assert!(record.audio_url.is_none());
        assert!(record.duration.is_none());
    }
}
