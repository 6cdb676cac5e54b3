//! Text helpers used throughout the pipeline.
//!
//! - [`chunk_text`]: split a message on line boundaries under a size budget
//! - [`truncate_for_log`]: shorten response bodies before they hit the logs
//! - [`collapse_whitespace`]: normalize feed titles

use once_cell::sync::Lazy;
use regex::Regex;

/// Per-message budget for webhook posts, under Discord's 2000 limit.
pub const DEFAULT_CHUNK_LEN: usize = 1800;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Split `text` into chunks of at most `max_len` characters, on line boundaries.
///
/// Every line is charged its character count plus one for the separator. A
/// line that would push the running total past `max_len` starts a new chunk,
/// unless the current chunk is still empty. A single line longer than
/// `max_len` therefore becomes its own oversized chunk; lines are never cut.
///
/// Joining the result with `"\n"` gives back `text` exactly. Empty input
/// yields no chunks.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(chunk_text("ab\ncd\nefghij", 10), vec!["ab\ncd", "efghij"]);
/// assert!(chunk_text("", 10).is_empty());
/// ```
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut total = 0usize;

    for line in text.split('\n') {
        let cost = line.chars().count() + 1;
        if total + cost > max_len && !buf.is_empty() {
            chunks.push(buf.join("\n"));
            buf.clear();
            total = 0;
        }
        buf.push(line);
        total += cost;
    }
    if !buf.is_empty() {
        chunks.push(buf.join("\n"));
    }
    chunks
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and byte
/// count indicator appended. Cuts always land on a char boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Trim `s` and squash every internal whitespace run to one space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}
