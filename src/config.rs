//! Validated runtime settings.

use crate::cli::Cli;
use crate::errors::{DigestError, Result};
use std::fmt;
use url::Url;

/// Settings for one run, checked before any network call is made.
#[derive(Clone)]
pub struct Settings {
    pub feed_url: Url,
    pub model: String,
    pub webhook_url: Url,
    pub api_key: String,
}

impl Settings {
    /// Validate parsed CLI/env values.
    ///
    /// # Errors
    ///
    /// - [`DigestError::MissingConfig`] when the webhook URL or API key is
    ///   absent or blank
    /// - [`DigestError::InvalidUrl`] when a URL does not parse
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let webhook_url = required(cli.webhook_url, "DISCORD_WEBHOOK_URL")?;
        let api_key = required(cli.api_key, "GEMINI_API_KEY")?;

        Ok(Settings {
            feed_url: parse_url(&cli.feed_url, "NEWS_RSS_URL")?,
            model: cli.model.trim().to_string(),
            webhook_url: parse_url(&webhook_url, "DISCORD_WEBHOOK_URL")?,
            api_key,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("feed_url", &self.feed_url.as_str())
            .field("model", &self.model)
            .field("webhook_host", &self.webhook_url.host_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DigestError::MissingConfig(name)),
    }
}

fn parse_url(raw: &str, name: &'static str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|source| DigestError::InvalidUrl { name, source })
}
