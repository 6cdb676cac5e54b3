//! Data models for feed items and the wire formats of the external services.
//!
//! - [`FeedEntry`]: one entry as read from an RSS or Atom document
//! - [`NewsItem`]: a feed entry that survived the date filter
//! - Gemini `generateContent` request/response types
//! - [`WebhookPayload`]: the body posted to the chat webhook
//!
//! The Gemini types use `rename_all = "camelCase"` to match the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feed entry, before date filtering.
///
/// Timestamps the feed parser could not read are `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// `pubDate` (RSS) or `published` (Atom).
    pub published: Option<DateTime<Utc>>,
    /// `updated` (Atom).
    pub updated: Option<DateTime<Utc>>,
    /// Publisher named by the entry's `<source>`, when present.
    pub source: Option<String>,
}

/// A news item published today, ready to be summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    /// Publisher name; empty when the feed does not carry one.
    pub source: String,
    pub link: String,
}

impl From<FeedEntry> for NewsItem {
    fn from(entry: FeedEntry) -> Self {
        NewsItem {
            title: entry.title,
            source: entry.source.unwrap_or_default(),
            link: entry.link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single-turn request carrying `prompt` as its only text part.
    pub fn from_prompt(prompt: &str) -> Self {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Reason the prompt was rejected, when the API reports one.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx Gemini responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// JSON body accepted by a Discord-style webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub content: &'a str,
}
