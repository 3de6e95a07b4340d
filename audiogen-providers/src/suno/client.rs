//! Suno HTTP Client

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use rand::RngExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{check_response, json_with_limit, AudioClientError};
use crate::types::GeneratedAudio;

use super::types::{
    BillingInfo, ClerkClientEnvelope, ClerkTokenResponse, CreditsInfo, CustomGenerateOptions,
    ExtendOptions, GenerateOptions, GenerateResponse, LyricsJob, LyricsResult,
    LyricsSubmitResponse, RawClip,
};

/// Default generation model.
pub const DEFAULT_MODEL: &str = "chirp-v3-5";

/// Clerk frontend version the studio web app pins; the token endpoints
/// reject requests without it.
const CLERK_JS_VERSION: &str = "4.73.4";

/// Shared HTTP client for all Suno requests (connection pooling)
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build Suno shared HTTP client")
});

/// Suno client configuration.
///
/// Delay windows are `(min, max)` seconds; a random duration inside the
/// window is slept each time. `min` must not exceed `max` (swapped if it
/// does).
#[derive(Debug, Clone)]
pub struct SunoConfig {
    /// Studio API base URL. Default `https://studio-api.suno.ai`.
    pub base_url: String,
    /// Clerk identity provider base URL. Default `https://clerk.suno.com`.
    pub clerk_base_url: String,
    /// Delay window applied after `renew(true)`. Default `(1, 2)`.
    pub renew_wait_secs: (u64, u64),
    /// Delay window between feed polls. Default `(3, 6)`.
    pub poll_wait_secs: (u64, u64),
    /// Overall wall-clock bound on a poll loop. Once exceeded the loop
    /// returns the last-seen clips even if non-terminal. Default `100`.
    pub poll_deadline_secs: u64,
    /// Fixed interval between lyrics job polls. Default `2`.
    pub lyrics_poll_secs: u64,
}

impl Default for SunoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://studio-api.suno.ai".to_string(),
            clerk_base_url: "https://clerk.suno.com".to_string(),
            renew_wait_secs: (1, 2),
            poll_wait_secs: (3, 6),
            poll_deadline_secs: 100,
            lyrics_poll_secs: 2,
        }
    }
}

/// Suno HTTP Client
///
/// Owns its credential state: the account cookie provided at construction,
/// the Clerk session id obtained by [`SunoClient::init`], and the bearer
/// token replaced wholesale on every renewal. Operations renew the token
/// before talking to the studio API, so the most recently issued token is
/// always the one in use.
pub struct SunoClient {
    client: Client,
    config: SunoConfig,
    cookie: String,
    session_id: Option<String>,
    token: Option<String>,
}

impl SunoClient {
    /// Create a client with default configuration (reuses the shared
    /// connection pool). `cookie` is the browser cookie of a logged-in
    /// Suno account.
    pub fn new(cookie: impl Into<String>) -> Self {
        Self::with_config(cookie, SunoConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(cookie: impl Into<String>, config: SunoConfig) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            config,
            cookie: cookie.into(),
            session_id: None,
            token: None,
        }
    }

    /// Check whether a bearer token is currently held.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Perform the Clerk handshake: exchange the account cookie for a
    /// session id, then obtain the first bearer token.
    pub async fn init(&mut self) -> Result<(), AudioClientError> {
        let url = format!(
            "{}/v1/client?_clerk_js_version={CLERK_JS_VERSION}",
            self.config.clerk_base_url
        );
        let resp = self
            .client
            .get(&url)
            .headers(self.clerk_headers()?)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let envelope: ClerkClientEnvelope = json_with_limit(resp).await?;

        let data = envelope
            .response
            .ok_or_else(|| AudioClientError::Auth("Clerk handshake returned no client".to_string()))?;
        let session_id = data
            .last_active_session_id
            .or_else(|| data.sessions.first().map(|s| s.id.clone()))
            .ok_or_else(|| {
                AudioClientError::Auth("no active session for the provided cookie".to_string())
            })?;

        debug!(session_id = %session_id, "Clerk session established");
        self.session_id = Some(session_id);
        self.renew(false).await?;
        info!("Suno session initialized");
        Ok(())
    }

    /// Exchange the stored session id for a fresh bearer token, replacing
    /// the old one unconditionally.
    ///
    /// With `wait_after` set, sleeps a random duration inside the
    /// `renew_wait_secs` window after the exchange, so a renewal chained
    /// immediately before another call does not hammer the remote service.
    pub async fn renew(&mut self, wait_after: bool) -> Result<(), AudioClientError> {
        let session_id = self.session_id.clone().ok_or_else(|| {
            AudioClientError::Auth("session not initialized; call init() first".to_string())
        })?;
        let url = format!(
            "{}/v1/client/sessions/{session_id}/tokens?_clerk_js_version={CLERK_JS_VERSION}",
            self.config.clerk_base_url
        );
        let resp = self
            .client
            .post(&url)
            .headers(self.clerk_headers()?)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let token: ClerkTokenResponse = json_with_limit(resp).await?;
        self.token = Some(token.jwt);
        debug!("bearer token renewed");

        if wait_after {
            let (min, max) = self.config.renew_wait_secs;
            sleep_window(min, max).await;
        }
        Ok(())
    }

    /// Clear cookie, session id, and token. Idempotent.
    pub fn deinit(&mut self) {
        self.cookie.clear();
        self.session_id = None;
        self.token = None;
    }

    /// Submit a description-mode generation request.
    ///
    /// With `wait_audio` set, polls the feed until the clips reach a
    /// terminal state or the deadline passes (see [`SunoConfig`]).
    pub async fn generate(
        &mut self,
        options: GenerateOptions,
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        self.renew(true).await?;
        let body = json!({
            "gpt_description_prompt": options.prompt,
            "make_instrumental": options.make_instrumental,
            "mv": options.model.as_deref().unwrap_or(DEFAULT_MODEL),
            "prompt": "",
        });
        let clips = self.submit_generation(&body).await?;
        self.finish_generation(clips, options.wait_audio).await
    }

    /// Submit a custom-mode generation request (caller supplies lyrics,
    /// tags, and title).
    pub async fn custom_generate(
        &mut self,
        options: CustomGenerateOptions,
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        self.renew(true).await?;
        let mut body = serde_json::Map::new();
        body.insert("prompt".to_string(), json!(options.prompt));
        body.insert("tags".to_string(), json!(options.tags));
        body.insert("title".to_string(), json!(options.title));
        body.insert("make_instrumental".to_string(), json!(options.make_instrumental));
        body.insert(
            "mv".to_string(),
            json!(options.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        body.insert("generation_type".to_string(), json!("TEXT"));
        if let Some(negative_tags) = &options.negative_tags {
            body.insert("negative_tags".to_string(), json!(negative_tags));
        }
        let clips = self.submit_generation(&Value::Object(body)).await?;
        self.finish_generation(clips, options.wait_audio).await
    }

    /// Continue an existing clip from a given timestamp. Returns the
    /// submitted clips without polling.
    pub async fn extend_audio(
        &mut self,
        options: ExtendOptions,
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        self.renew(true).await?;
        let mut body = serde_json::Map::new();
        body.insert("continue_clip_id".to_string(), json!(options.audio_id));
        body.insert("task".to_string(), json!("extend"));
        body.insert(
            "mv".to_string(),
            json!(options.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        if let Some(continue_at) = options.continue_at {
            body.insert("continue_at".to_string(), json!(continue_at));
        }
        if let Some(prompt) = &options.prompt {
            body.insert("prompt".to_string(), json!(prompt));
        }
        if let Some(tags) = &options.tags {
            body.insert("tags".to_string(), json!(tags));
        }
        if let Some(title) = &options.title {
            body.insert("title".to_string(), json!(title));
        }
        let clips = self.submit_generation(&Value::Object(body)).await?;
        Ok(clips.into_iter().map(Into::into).collect())
    }

    /// Fetch clips from the feed, optionally restricted to the given ids.
    pub async fn get(
        &mut self,
        ids: Option<&[String]>,
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        let clips = self.fetch_raw_clips(ids).await?;
        Ok(clips.into_iter().map(Into::into).collect())
    }

    /// Fetch a single clip by id.
    pub async fn get_clip(&mut self, id: &str) -> Result<GeneratedAudio, AudioClientError> {
        self.renew(false).await?;
        let url = format!("{}/api/clip/{id}", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .headers(self.api_headers()?)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let clip: RawClip = json_with_limit(resp).await?;
        Ok(clip.into())
    }

    /// Fetch remaining account credits.
    pub async fn get_credits(&mut self) -> Result<CreditsInfo, AudioClientError> {
        self.renew(false).await?;
        let url = format!("{}/api/billing/info/", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .headers(self.api_headers()?)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let billing: BillingInfo = json_with_limit(resp).await?;
        Ok(billing.into())
    }

    /// Generate lyrics from a free-text prompt. Polls the lyrics job at a
    /// fixed interval until the remote side reports `complete`.
    pub async fn generate_lyrics(&mut self, prompt: &str) -> Result<LyricsResult, AudioClientError> {
        self.renew(true).await?;
        let url = format!("{}/api/generate/lyrics/", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .headers(self.api_headers()?)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;
        let resp = check_response(resp)?;
        let submitted: LyricsSubmitResponse = json_with_limit(resp).await?;
        debug!(lyrics_id = %submitted.id, "lyrics job submitted");

        let status_url = format!("{}/api/generate/lyrics/{}", self.config.base_url, submitted.id);
        loop {
            let resp = self
                .client
                .get(&status_url)
                .headers(self.api_headers()?)
                .send()
                .await?;
            let resp = check_response(resp)?;
            let job: LyricsJob = json_with_limit(resp).await?;
            if job.status == "complete" {
                info!(lyrics_id = %submitted.id, "lyrics job completed");
                return Ok(LyricsResult {
                    title: job.title.unwrap_or_default(),
                    text: job.text.unwrap_or_default(),
                });
            }
            debug!(lyrics_id = %submitted.id, status = %job.status, "lyrics job pending");
            tokio::time::sleep(Duration::from_secs(self.config.lyrics_poll_secs)).await;
        }
    }

    async fn submit_generation(&self, body: &Value) -> Result<Vec<RawClip>, AudioClientError> {
        let url = format!("{}/api/generate/v2/", self.config.base_url);
        debug!(url = %url, "submitting generation request");
        let resp = self
            .client
            .post(&url)
            .headers(self.api_headers()?)
            .json(body)
            .send()
            .await?;
        let resp = check_response(resp)?;
        let generated: GenerateResponse = json_with_limit(resp).await?;
        Ok(generated.clips)
    }

    async fn finish_generation(
        &mut self,
        clips: Vec<RawClip>,
        wait_audio: bool,
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        if !wait_audio {
            return Ok(clips.into_iter().map(Into::into).collect());
        }
        let ids: Vec<String> = clips.iter().map(|clip| clip.id.clone()).collect();
        self.wait_for_audio(&ids).await
    }

    /// Poll the feed until every clip is in a success state.
    ///
    /// Fails with `JobFailed` as soon as any clip reports a failure state.
    /// Once the wall-clock deadline passes, the last-seen clips are returned
    /// as-is even if still non-terminal; the caller can re-fetch later via
    /// [`SunoClient::get`].
    async fn wait_for_audio(
        &mut self,
        ids: &[String],
    ) -> Result<Vec<GeneratedAudio>, AudioClientError> {
        // A submit that yielded no clips leaves nothing to poll for; an
        // unfiltered feed query would only return unrelated clips.
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let deadline = Instant::now() + Duration::from_secs(self.config.poll_deadline_secs);
        loop {
            let clips = self.fetch_raw_clips(Some(ids)).await?;
            if let Some(failed) = clips.iter().find(|clip| clip.status.is_failure()) {
                return Err(AudioClientError::JobFailed {
                    status: failed.status.as_str().to_string(),
                    detail: failed.metadata.error_message.clone(),
                });
            }
            let all_done = !clips.is_empty() && clips.iter().all(|clip| clip.status.is_success());
            if all_done || Instant::now() >= deadline {
                if all_done {
                    info!(clips = clips.len(), "generation completed");
                } else {
                    debug!(clips = clips.len(), "poll deadline reached, returning last-seen clips");
                }
                return Ok(clips.into_iter().map(Into::into).collect());
            }
            let (min, max) = self.config.poll_wait_secs;
            sleep_window(min, max).await;
        }
    }

    /// Feed read used by [`SunoClient::get`] and the poll loop. Renews the
    /// token first, unconditionally.
    async fn fetch_raw_clips(
        &mut self,
        ids: Option<&[String]>,
    ) -> Result<Vec<RawClip>, AudioClientError> {
        self.renew(false).await?;
        let url = format!("{}/api/feed/", self.config.base_url);
        let mut request = self.client.get(&url).headers(self.api_headers()?);
        if let Some(ids) = ids {
            request = request.query(&[("ids", ids.join(","))]);
        }
        let resp = check_response(request.send().await?)?;
        json_with_limit(resp).await
    }

    /// Headers for studio API calls: JSON accept plus the current bearer
    /// token, when one is held.
    fn api_headers(&self) -> Result<HeaderMap, AudioClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        Ok(headers)
    }

    /// Headers for Clerk calls: JSON accept plus the account cookie.
    fn clerk_headers(&self) -> Result<HeaderMap, AudioClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(COOKIE, HeaderValue::from_str(&self.cookie)?);
        Ok(headers)
    }
}

/// Sleep a random duration inside the `(min, max)` seconds window.
async fn sleep_window(min_secs: u64, max_secs: u64) {
    let (lo, hi) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    let millis = rand::rng().random_range(lo * 1000..=hi * 1000);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SunoConfig::default();
        assert_eq!(config.base_url, "https://studio-api.suno.ai");
        assert_eq!(config.clerk_base_url, "https://clerk.suno.com");
        assert_eq!(config.poll_deadline_secs, 100);
        assert_eq!(config.poll_wait_secs, (3, 6));
    }

    #[test]
    fn test_client_starts_uninitialized() {
        let client = SunoClient::new("__client=abc");
        assert!(!client.has_token());
        assert!(client.session_id.is_none());
    }

    #[test]
    fn test_deinit_is_idempotent() {
        let mut client = SunoClient::new("__client=abc");
        client.token = Some("jwt".to_string());
        client.session_id = Some("sess".to_string());
        client.deinit();
        client.deinit();
        assert!(!client.has_token());
        assert!(client.session_id.is_none());
        assert!(client.cookie.is_empty());
    }

    #[tokio::test]
    async fn test_renew_before_init_fails() {
        let mut client = SunoClient::new("__client=abc");
        let err = client.renew(false).await.unwrap_err();
        assert!(matches!(err, AudioClientError::Auth(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_window_stays_in_bounds() {
        let start = tokio::time::Instant::now();
        sleep_window(1, 2).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed <= Duration::from_secs(2) + Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_sleep_window_swaps_inverted_bounds() {
        // (0, 0) after the swap; must not panic on an empty range.
        sleep_window(0, 0).await;
    }
}
