//! Command-line interface definitions.
//!
//! Every option is read from its environment variable, and `.env` is loaded
//! before parsing. The flags exist for one-off overrides; there are no
//! settings beyond these four variables.

use clap::Parser;

/// Google News RSS search: BTC stories on blocktempo.com from the last day, zh-TW.
pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss/search?q=site:blocktempo.com+(BTC+OR+%E6%AF%94%E7%89%B9%E5%B9%A3)+when:1d&hl=zh-TW&gl=TW&ceid=TW:zh-Hant";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Runtime options for a digest run.
///
/// # Examples
///
/// ```sh
/// # Everything from the environment (or .env)
/// DISCORD_WEBHOOK_URL=https://discord.com/api/webhooks/... GEMINI_API_KEY=... btc_news_digest
///
/// # Different feed, same credentials
/// btc_news_digest --feed-url "https://example.com/feed.xml"
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// RSS or Atom feed to read
    #[arg(long, env = "NEWS_RSS_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Gemini model used for the digest
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Webhook that receives the digest (required)
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Gemini API key (required)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
