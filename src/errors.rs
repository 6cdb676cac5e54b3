//! Error type shared by every stage of the digest pipeline.

use thiserror::Error;

/// Everything that can end a digest run.
///
/// Each variant is fatal: the pipeline is all-or-nothing, so callers
/// propagate these up to `main` rather than recovering.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("missing required configuration {0}; set it in the environment or .env")]
    MissingConfig(&'static str),

    #[error("failed to load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse feed: {0}")]
    FeedParse(String),

    #[error("generative model returned HTTP {status}: {message}")]
    Model { status: u16, message: String },

    #[error("prompt was blocked by the model: {0}")]
    Blocked(String),

    #[error("generative model returned no text")]
    EmptyResponse,

    #[error("webhook returned HTTP {status}: {body}")]
    Webhook { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, DigestError>;
