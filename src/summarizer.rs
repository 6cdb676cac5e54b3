//! Turn today's items into a digest via the generative model.

use crate::api::{AskAsync, RetryAsk};
use crate::errors::Result;
use crate::models::NewsItem;
use itertools::Itertools;
use tracing::{info, instrument};

/// Returned, without calling the model, when no items were found.
pub const FALLBACK_SUMMARY: &str = "今日沒有抓到 BTC 相關新聞。";

const PROMPT_HEADER: &str = "你是新聞彙整助手。請用繁體中文整理「今日 BTC 相關新聞」。
請遵守：
1) 先給一句總結（不超過 20 字）
2) 最多 8 則重點，每行格式：標題 — 一句話摘要 — 來源 — 連結
3) 全文不超過 1000 字

以下是今日新聞清單（標題 | 來源 | 連結）：";

/// Render `items` as `- title | source | link` lines under the digest instructions.
pub fn build_prompt(items: &[NewsItem]) -> String {
    let lines = items
        .iter()
        .map(|i| format!("- {} | {} | {}", i.title, i.source, i.link))
        .join("\n");
    format!("{PROMPT_HEADER}\n{lines}\n")
}

/// Summarize `items` with `model`, making up to three attempts.
///
/// An empty list short-circuits to [`FALLBACK_SUMMARY`]. If every attempt
/// fails, the error from the last one is returned.
#[instrument(level = "info", skip_all, fields(items = items.len()))]
pub async fn summarize<M: AskAsync>(items: &[NewsItem], model: M) -> Result<String> {
    if items.is_empty() {
        info!("No items today; using fallback summary");
        return Ok(FALLBACK_SUMMARY.to_string());
    }

    let prompt = build_prompt(items);
    let summary = RetryAsk::new(model).ask(&prompt).await?;
    let summary = summary.trim().to_string();
    info!(chars = summary.chars().count(), "Summary generated");
    Ok(summary)
}
