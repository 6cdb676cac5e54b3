//! Generative-text API interaction with a fixed-attempt retry loop.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait defining async prompt → text interaction
//! - [`GeminiClient`]: talks to the Gemini `generateContent` REST endpoint
//! - [`RetryAsk`]: decorator that retries any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - At most [`MAX_ATTEMPTS`] calls
//! - No delay between attempts
//! - Only the last error is returned; earlier ones are logged and dropped

use crate::errors::{DigestError, Result};
use crate::models::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::utils::truncate_for_log;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Total number of calls [`RetryAsk`] makes before giving up.
pub const MAX_ATTEMPTS: usize = 3;

/// Public Gemini REST endpoint.
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its plain-text reply.
/// This abstraction lets [`RetryAsk`] wrap real clients and test doubles alike.
pub trait AskAsync {
    async fn ask(&self, prompt: &str) -> Result<String>;
}

/// Wrapper that retries an [`AskAsync`] implementation back to back.
pub struct RetryAsk<T> {
    inner: T,
    max_attempts: usize,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Wrap `inner` with [`MAX_ATTEMPTS`] attempts.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Wrap `inner` with a custom attempt budget (at least one).
    #[cfg(test)]
    pub(crate) fn with_attempts(inner: T, max_attempts: usize) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let attempt_t0 = Instant::now();
            match self.inner.ask(prompt).await {
                Ok(resp) => {
                    debug!(attempt, elapsed_ms_total = total_t0.elapsed().as_millis(), "ask() succeeded");
                    return Ok(resp);
                }
                Err(e) if attempt >= self.max_attempts => {
                    error!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        error = %e,
                        "ask() exhausted attempts"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis(),
                        error = %e,
                        "ask() attempt failed; retrying"
                    );
                }
            }
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at another base URL.
    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.model)
        )
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl AskAsync for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &str) -> Result<String> {
        let t0 = Instant::now();
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis();

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
                Ok(env) => env.error.message,
                Err(_) => truncate_for_log(&body, 300),
            };
            warn!(status = status.as_u16(), elapsed_ms, %message, "Gemini call failed");
            return Err(DigestError::Model {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            DigestError::Model {
                status: status.as_u16(),
                message: format!("unexpected response body ({e}): {}", truncate_for_log(&body, 300)),
            }
        })?;
        debug!(elapsed_ms, bytes = body.len(), "Gemini call returned");
        extract_text(parsed)
    }
}

/// Pull the reply text out of a successful response.
pub fn extract_text(resp: GenerateContentResponse) -> Result<String> {
    if let Some(text) = resp.text() {
        return Ok(text);
    }
    if let Some(reason) = resp.block_reason() {
        return Err(DigestError::Blocked(reason.to_string()));
    }
    let finish_reason = resp
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("none");
    warn!(finish_reason, "Gemini response carried no text");
    Err(DigestError::EmptyResponse)
}
