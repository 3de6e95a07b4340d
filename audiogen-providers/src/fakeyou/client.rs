//! FakeYou HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use regex::RegexBuilder;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{bytes_with_limit, check_response, json_with_limit, AudioClientError};
use crate::types::GeneratedAudio;

use super::types::{
    EnvelopeStatus, InferenceJobPayload, ModelListPayload, TtsJobPayload, TtsModel, TtsOptions,
    VoiceConversionJobPayload, VoiceConversionOptions,
};

/// Shared HTTP client for all FakeYou requests (connection pooling)
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build FakeYou shared HTTP client")
});

/// FakeYou client configuration.
#[derive(Debug, Clone)]
pub struct FakeYouConfig {
    /// API base URL. Default `https://api.fakeyou.com`.
    pub base_url: String,
    /// Prefix for bucket-relative result paths. Default
    /// `https://storage.googleapis.com/vocodes-public`.
    pub storage_base_url: String,
}

impl Default for FakeYouConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.fakeyou.com".to_string(),
            storage_base_url: "https://storage.googleapis.com/vocodes-public".to_string(),
        }
    }
}

/// FakeYou HTTP Client
///
/// Holds at most one credential: the session cookie issued by
/// [`FakeYouClient::login`]. All endpoints work anonymously too; the remote
/// side rejects the ones that require an account.
pub struct FakeYouClient {
    client: Client,
    config: FakeYouConfig,
    session_cookie: Option<String>,
}

impl FakeYouClient {
    /// Create a client with default configuration (reuses the shared
    /// connection pool).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FakeYouConfig::default())
    }

    /// Create a client with explicit configuration.
    #[must_use]
    pub fn with_config(config: FakeYouConfig) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            config,
            session_cookie: None,
        }
    }

    /// Check whether a session cookie is currently held.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session_cookie.is_some()
    }

    /// Login with username (or email) and password. The session cookie set
    /// by the response is stored and sent on subsequent calls.
    pub async fn login(
        &mut self,
        username_or_email: &str,
        password: &str,
    ) -> Result<(), AudioClientError> {
        let url = format!("{}/login", self.config.base_url);
        let body = json!({
            "username_or_email": username_or_email,
            "password": password,
        });
        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp)?;

        // The cookie must be read before the body consumes the response.
        let session_cookie = resp
            .cookies()
            .find(|cookie| cookie.name().ends_with("session"))
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()));

        let url = resp.url().to_string();
        let status: EnvelopeStatus = json_with_limit(resp).await?;
        if !status.success {
            return Err(AudioClientError::Auth(
                status
                    .error_reason
                    .unwrap_or_else(|| format!("login rejected by {url}")),
            ));
        }

        self.session_cookie = Some(session_cookie.ok_or_else(|| {
            AudioClientError::Auth("login did not set a session cookie".to_string())
        })?);
        info!("logged in to FakeYou");
        Ok(())
    }

    /// Clear the stored session cookie. Idempotent.
    pub fn logout(&mut self) {
        self.session_cookie = None;
    }

    /// Fetch the full voice model list.
    pub async fn list_models(&self) -> Result<Vec<TtsModel>, AudioClientError> {
        let url = format!("{}/tts/list", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .headers(self.build_headers()?)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let payload: ModelListPayload = unwrap_success(resp).await?;
        Ok(payload.models)
    }

    /// Fetch the model list and filter/sort it locally; see
    /// [`filter_models`] for the matching and ordering rules.
    pub async fn search(
        &self,
        query: &str,
        language: Option<&str>,
    ) -> Result<Vec<TtsModel>, AudioClientError> {
        let models = self.list_models().await?;
        filter_models(models, query, language)
    }

    /// Run text-to-speech inference and poll the job until it terminates.
    pub async fn generate_tts(
        &self,
        model_token: &str,
        text: &str,
        options: &TtsOptions,
    ) -> Result<GeneratedAudio, AudioClientError> {
        let url = format!("{}/tts/inference", self.config.base_url);
        let body = json!({
            "uuid_idempotency_token": Uuid::new_v4().to_string(),
            "tts_model_token": model_token,
            "inference_text": text,
        });
        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let job: InferenceJobPayload = unwrap_success(resp).await?;
        debug!(job_token = %job.inference_job_token, "TTS job submitted");
        self.wait_for_tts_job(&job.inference_job_token, options.poll_interval)
            .await
    }

    /// Convert recorded audio to the given voice and poll the job until it
    /// terminates.
    pub async fn voice_to_voice(
        &self,
        model_token: &str,
        audio: Vec<u8>,
        options: &VoiceConversionOptions,
    ) -> Result<GeneratedAudio, AudioClientError> {
        let url = format!("{}/v1/voice_conversion/inference", self.config.base_url);
        let part = Part::bytes(audio)
            .file_name(options.file_name.clone())
            .mime_str(&options.mime_type)?;
        let form = Form::new()
            .text("uuid_idempotency_token", Uuid::new_v4().to_string())
            .text("voice_conversion_model_token", model_token.to_string())
            .part("source_audio", part);
        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .multipart(form)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let job: InferenceJobPayload = unwrap_success(resp).await?;
        debug!(job_token = %job.inference_job_token, "voice conversion job submitted");
        self.wait_for_conversion_job(&job.inference_job_token, options.poll_interval)
            .await
    }

    /// Poll a TTS job at a fixed interval until terminal. No overall
    /// deadline: only a failure state or a success state ends the loop.
    async fn wait_for_tts_job(
        &self,
        job_token: &str,
        interval: Duration,
    ) -> Result<GeneratedAudio, AudioClientError> {
        let url = format!("{}/tts/job/{job_token}", self.config.base_url);
        loop {
            let resp = self
                .client
                .get(&url)
                .headers(self.build_headers()?)
                .send()
                .await?;
            let resp = check_response(resp)?;
            let payload: TtsJobPayload = unwrap_success(resp).await?;
            let state = payload.state;
            debug!(job_token = %job_token, status = state.status.as_str(), "TTS job state");

            if state.status.is_failure() {
                return Err(AudioClientError::JobFailed {
                    status: state.status.as_str().to_string(),
                    detail: state.maybe_extra_status_description,
                });
            }
            if state.status.is_success() {
                if state.maybe_public_bucket_wav_audio_path.is_none() {
                    return Err(AudioClientError::MissingResult(format!(
                        "TTS job {job_token} completed without an audio path"
                    )));
                }
                info!(job_token = %job_token, "TTS job completed");
                return Ok(state.into_generated(&self.config.storage_base_url));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Same loop as [`Self::wait_for_tts_job`] against the voice conversion
    /// job status endpoint.
    async fn wait_for_conversion_job(
        &self,
        job_token: &str,
        interval: Duration,
    ) -> Result<GeneratedAudio, AudioClientError> {
        let url = format!(
            "{}/v1/model_inference/job_status/{job_token}",
            self.config.base_url
        );
        loop {
            let resp = self
                .client
                .get(&url)
                .headers(self.build_headers()?)
                .send()
                .await?;
            let resp = check_response(resp)?;
            let payload: VoiceConversionJobPayload = unwrap_success(resp).await?;
            let state = payload.state;
            debug!(job_token = %job_token, status = state.status.as_str(), "conversion job state");

            if state.status.is_failure() {
                return Err(AudioClientError::JobFailed {
                    status: state.status.as_str().to_string(),
                    detail: state.maybe_extra_status_description,
                });
            }
            if state.status.is_success() {
                if state.maybe_public_bucket_media_path.is_none() {
                    return Err(AudioClientError::MissingResult(format!(
                        "conversion job {job_token} completed without a media path"
                    )));
                }
                info!(job_token = %job_token, "voice conversion job completed");
                return Ok(state.into_generated(&self.config.storage_base_url));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Build request headers: JSON accept plus the session cookie, when one
    /// is held.
    fn build_headers(&self) -> Result<HeaderMap, AudioClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref cookie) = self.session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        Ok(headers)
    }
}

impl Default for FakeYouClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a FakeYou envelope and return its typed payload.
///
/// The services answer HTTP 2xx for application-level failures too, so the
/// `success` flag is checked even after the status gate. Failure bodies
/// carry no payload fields, so the flag is decoded on its own first and the
/// payload only from the same bytes of a body that reports success.
async fn unwrap_success<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, AudioClientError> {
    let url = resp.url().to_string();
    let bytes = bytes_with_limit(resp).await?;
    let status: EnvelopeStatus = serde_json::from_slice(&bytes)?;
    if !status.success {
        return Err(AudioClientError::Api {
            url,
            message: status
                .error_reason
                .unwrap_or_else(|| "service reported failure".to_string()),
        });
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}

/// Filter models by a case-insensitive, whitespace-flexible title match,
/// then order them.
///
/// Each whitespace-separated word of `query` is regex-escaped (so `.`,
/// `*`, `+` and friends match literally) and the words are joined with
/// `\s*`. Models whose language tag starts with the two-letter `language`
/// hint sort first; within each group the order is case-insensitive
/// alphabetical by title.
pub fn filter_models(
    models: Vec<TtsModel>,
    query: &str,
    language: Option<&str>,
) -> Result<Vec<TtsModel>, AudioClientError> {
    let pattern = query
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    let matcher = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| AudioClientError::Parse(format!("invalid search pattern: {e}")))?;

    let mut hits: Vec<TtsModel> = models
        .into_iter()
        .filter(|model| matcher.is_match(&model.title))
        .collect();

    let hint = language.map(str::to_ascii_lowercase);
    hits.sort_by(|a, b| {
        let (a_misses, b_misses) = match &hint {
            Some(hint) => (!language_matches(a, hint), !language_matches(b, hint)),
            None => (false, false),
        };
        a_misses
            .cmp(&b_misses)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
    Ok(hits)
}

/// True when the first two characters of the model's language tag equal the
/// hint, ignoring case.
fn language_matches(model: &TtsModel, hint: &str) -> bool {
    model
        .ietf_language_tag
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(token: &str, title: &str, lang: &str) -> TtsModel {
        TtsModel {
            model_token: token.to_string(),
            title: title.to_string(),
            ietf_language_tag: lang.to_string(),
            ietf_primary_language_subtag: lang.get(..2).unwrap_or("").to_string(),
            creator_display_name: None,
            user_ratings: None,
        }
    }

    #[test]
    fn test_client_starts_logged_out() {
        let client = FakeYouClient::new();
        assert!(!client.is_logged_in());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut client = FakeYouClient::new();
        client.session_cookie = Some("session=abc".to_string());
        client.logout();
        client.logout();
        assert!(!client.is_logged_in());
    }

    #[test]
    fn test_config_defaults() {
        let config = FakeYouConfig::default();
        assert_eq!(config.base_url, "https://api.fakeyou.com");
        assert_eq!(
            config.storage_base_url,
            "https://storage.googleapis.com/vocodes-public"
        );
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let models = vec![
            model("TM:1", "Mario (SM64)", "en-US"),
            model("TM:2", "Luigi", "en-US"),
            model("TM:3", "Super MARIO Narrator", "en-GB"),
        ];
        let hits = filter_models(models, "mario", None).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|m| m.title.to_lowercase().contains("mario")));
    }

    #[test]
    fn test_filter_results_sorted_by_title_without_hint() {
        let models = vec![
            model("TM:1", "Zelda", "en-US"),
            model("TM:2", "Alvin", "en-US"),
            model("TM:3", "mario", "en-US"),
        ];
        let hits = filter_models(models, "", None).unwrap();
        let titles: Vec<&str> = hits.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alvin", "mario", "Zelda"]);
    }

    #[test]
    fn test_filter_language_hint_sorts_first() {
        let models = vec![
            model("TM:1", "Mario (US)", "en-US"),
            model("TM:2", "Mario (FR)", "fr-FR"),
            model("TM:3", "Autre Mario (FR)", "fr-CA"),
        ];
        let hits = filter_models(models, "mario", Some("fr")).unwrap();
        let titles: Vec<&str> = hits.iter().map(|m| m.title.as_str()).collect();
        // Matching language first, each group alphabetical by title.
        assert_eq!(titles, vec!["Autre Mario (FR)", "Mario (FR)", "Mario (US)"]);
    }

    #[test]
    fn test_filter_regex_specials_are_literal() {
        let models = vec![
            model("TM:1", "C++. Compiler Voice", "en-US"),
            model("TM:2", "CXX Compiler Voice", "en-US"),
        ];
        let hits = filter_models(models, "C++.", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "C++. Compiler Voice");
    }

    #[test]
    fn test_filter_is_whitespace_flexible() {
        let models = vec![
            model("TM:1", "DrMario", "en-US"),
            model("TM:2", "Dr   Mario", "en-US"),
            model("TM:3", "Luigi", "en-US"),
        ];
        let hits = filter_models(models, "dr mario", None).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_filter_empty_query_returns_everything() {
        let models = vec![
            model("TM:1", "Mario", "en-US"),
            model("TM:2", "Luigi", "en-US"),
        ];
        let hits = filter_models(models, "", None).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_language_match_ignores_case_and_region() {
        let m = model("TM:1", "Mario", "EN-us");
        assert!(language_matches(&m, "en"));
        assert!(!language_matches(&m, "fr"));
        let empty = model("TM:2", "Mario", "");
        assert!(!language_matches(&empty, "en"));
    }
}
