//! Shared audio client error types
//!
//! Common error enum and utilities used by both service clients (Suno,
//! FakeYou).

use thiserror::Error;

/// Maximum response body size for provider HTTP calls (16 MB).
/// Prevents OOM from malicious or misconfigured upstream servers.
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Common error type for both audio service clients.
#[derive(Debug, Error)]
pub enum AudioClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("API failure at {url}: {message}")]
    Api { url: String, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Job failed with status {status}: {}", detail.as_deref().unwrap_or("no further detail"))]
    JobFailed { status: String, detail: Option<String> },

    #[error("Missing result: {0}")]
    MissingResult(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },
}

/// Read a response body with size limit.
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes.
pub async fn bytes_with_limit(
    response: reqwest::Response,
) -> Result<bytes::Bytes, AudioClientError> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(AudioClientError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(AudioClientError::ResponseTooLarge { size: bytes.len() as u64 });
    }
    Ok(bytes)
}

/// Read a response body with size limit and deserialize as JSON.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AudioClientError> {
    let bytes = bytes_with_limit(response).await?;
    serde_json::from_slice(&bytes).map_err(Into::into)
}

/// Check HTTP response status before processing body.
///
/// Both services use HTTP success codes for application-level failures too,
/// so this is only the first of two gates; the envelope check comes after.
pub fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AudioClientError> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(AudioClientError::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

impl From<reqwest::Error> for AudioClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AudioClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for AudioClientError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}
