//! Posting the digest to a chat webhook.
//!
//! The digest is split with [`chunk_text`] and each chunk is posted as its
//! own message, in order. The first failed post aborts the rest.

use crate::errors::{DigestError, Result};
use crate::models::WebhookPayload;
use crate::utils::{chunk_text, truncate_for_log};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Fixed timeout for each webhook post.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// A destination that accepts one message at a time.
pub trait PostMessage {
    async fn post(&self, content: &str) -> Result<()>;
}

/// Discord-style webhook taking `{"content": "..."}` bodies.
#[derive(Debug)]
pub struct DiscordWebhook {
    http: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

impl PostMessage for DiscordWebhook {
    async fn post(&self, content: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&WebhookPayload { content })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DigestError::Webhook {
            status: status.as_u16(),
            body: truncate_for_log(&body, 300),
        })
    }
}

/// Post `text` through `sink` in chunks of at most `max_len` characters.
///
/// Returns the number of chunks posted.
#[instrument(level = "info", skip_all, fields(chars = text.chars().count(), max_len = max_len))]
pub async fn send_summary<S: PostMessage>(sink: &S, text: &str, max_len: usize) -> Result<usize> {
    let t0 = Instant::now();
    let chunks = chunk_text(text, max_len);
    let total = chunks.len();

    for (i, chunk) in chunks.iter().enumerate() {
        if let Err(e) = sink.post(chunk).await {
            error!(chunk = i + 1, total, error = %e, "Webhook post failed; aborting remaining chunks");
            return Err(e);
        }
        debug!(chunk = i + 1, total, chars = chunk.chars().count(), "Posted chunk");
    }

    info!(chunks = total, elapsed_ms = t0.elapsed().as_millis(), "Summary delivered");
    Ok(total)
}
