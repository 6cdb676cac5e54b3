//! # BTC News Digest
//!
//! Fetches today's BTC headlines from a news feed, asks Gemini for a short
//! Traditional Chinese digest, and posts it to a Discord webhook.
//!
//! ## Usage
//!
//! ```sh
//! DISCORD_WEBHOOK_URL=... GEMINI_API_KEY=... btc_news_digest
//! ```
//!
//! ## Architecture
//!
//! The run is one straight pipeline; each stage finishes before the next:
//! 1. **Fetching**: read the feed and keep today's items (first 30)
//! 2. **Summarizing**: one prompt to Gemini, up to 3 attempts
//! 3. **Posting**: split the digest into ≤1800-char chunks and post each one
//!
//! Any failure aborts the run with a non-zero exit status.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod errors;
mod feed;
mod models;
mod notify;
mod summarizer;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::Settings;
use errors::DigestError;
use notify::{DiscordWebhook, send_summary};
use utils::DEFAULT_CHUNK_LEN;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env first, so RUST_LOG may come from it.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    tfmt()
        .with_env_filter(log_filter())
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("btc_news_digest starting up");

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => return Err(fatal(e.into())),
    }

    let settings = Settings::from_cli(Cli::parse()).map_err(fatal)?;
    debug!(?settings, "Loaded settings");

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fatal(e.into()))?;

    // ---- Fetch ----
    let items = feed::fetch_today_items(&http, settings.feed_url.as_str())
        .await
        .map_err(fatal)?;
    info!(count = items.len(), "Collected today's items");

    // ---- Summarize ----
    let model = GeminiClient::new(http.clone(), &settings.model, &settings.api_key);
    let summary = summarizer::summarize(&items, model).await.map_err(fatal)?;

    // ---- Post ----
    let webhook = DiscordWebhook::new(http, settings.webhook_url.as_str());
    let chunks = send_summary(&webhook, &summary, DEFAULT_CHUNK_LEN)
        .await
        .map_err(fatal)?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        items = items.len(),
        chunks,
        "Execution complete"
    );
    Ok(())
}

/// `RUST_LOG` filter, defaulting to `info`.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log a fatal error and hand it back for `main` to return.
fn fatal(e: DigestError) -> Box<dyn Error> {
    error!(error = %e, "Run aborted");
    Box::new(e)
}
