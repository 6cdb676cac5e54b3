//! Feed fetching, parsing, and date filtering.
//!
//! The fetcher reads one RSS or Atom document with `feed-rs` and keeps the
//! entries published today in the local timezone.
//!
//! # Field mapping
//!
//! | `FeedEntry` | from `feed_rs::model::Entry` |
//! |-------------|------------------------------|
//! | title | `title.content`, whitespace collapsed |
//! | link | first `alternate` (or rel-less) link, else first link |
//! | published / updated | `published` / `updated` |
//! | source | `source`, reduced to a host name when it is a URL |

use crate::errors::{DigestError, Result};
use crate::models::{FeedEntry, NewsItem};
use crate::utils::collapse_whitespace;
use chrono::{Local, NaiveDate, TimeZone};
use feed_rs::model::{Entry, Link};
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

/// Upper bound on items handed to the summarizer, taken in feed order.
pub const MAX_ITEMS: usize = 30;

/// Fetch the feed at `url` and return today's items.
///
/// "Today" is the current date in the local timezone. HTTP errors,
/// including non-2xx statuses, propagate to the caller.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_today_items(http: &reqwest::Client, url: &str) -> Result<Vec<NewsItem>> {
    let t0 = Instant::now();
    let body = http.get(url).send().await?.error_for_status()?.bytes().await?;
    debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Fetched feed");

    let entries = parse_feed(&body)?;
    let total = entries.len();

    let now = Local::now();
    let items = filter_today(entries, &Local, now.date_naive());
    info!(
        entries = total,
        kept = items.len(),
        today = %now.date_naive(),
        "Filtered feed to today's items"
    );
    Ok(items)
}

/// Keep entries whose publish date, seen in `tz`, equals `today`.
///
/// The timestamp is `published`, falling back to `updated`. Entries with
/// no readable timestamp are kept. At most [`MAX_ITEMS`] are returned.
pub fn filter_today<Tz: TimeZone>(entries: Vec<FeedEntry>, tz: &Tz, today: NaiveDate) -> Vec<NewsItem> {
    entries
        .into_iter()
        .filter(|entry| match entry.published.or(entry.updated) {
            Some(dt) => dt.with_timezone(tz).date_naive() == today,
            None => true,
        })
        .take(MAX_ITEMS)
        .map(NewsItem::from)
        .collect()
}

/// Parse every entry of an RSS or Atom document, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(xml).map_err(|e| DigestError::FeedParse(e.to_string()))?;
    let entries: Vec<FeedEntry> = feed.entries.into_iter().map(to_feed_entry).collect();
    debug!(count = entries.len(), "Parsed feed entries");
    Ok(entries)
}

fn to_feed_entry(entry: Entry) -> FeedEntry {
    FeedEntry {
        title: entry
            .title
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default(),
        link: entry_link(&entry.links),
        published: entry.published,
        updated: entry.updated,
        source: entry.source.as_deref().and_then(source_label),
    }
}

/// The link pointing at the entry itself.
fn entry_link(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|r| r == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}

/// Human-readable publisher for a `<source>` value.
///
/// URLs are reduced to their host (without `www.`); anything else is
/// taken as the publisher name.
pub fn source_label(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) if url.host_str().is_some() => url
            .host_str()
            .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()),
        _ => Some(collapse_whitespace(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>"BTC" - Google News</title>
    <link>https://news.google.com</link>
    <description>Google News</description>
    <item>
      <title>比特幣站上 10 萬美元 - 動區動趨</title>
      <link>https://news.google.com/articles/one</link>
      <pubDate>Wed, 14 Oct 2026 02:30:00 GMT</pubDate>
      <source url="https://www.blocktempo.com">動區動趨 BlockTempo</source>
    </item>
    <item>
      <title><![CDATA[ETF inflows surge]]></title>
      <link>https://news.google.com/articles/two</link>
      <pubDate>Tue, 13 Oct 2026 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Miners &amp; halving</title>
      <link>https://news.google.com/articles/three</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2026-10-14T12:00:00Z</updated>
  <link href="https://example.org/"/>
  <entry>
    <title>Atom entry</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <link rel="self" href="https://example.org/self/1"/>
    <link rel="alternate" href="https://example.org/2026/10/14/atom"/>
    <updated>2026-10-14T12:00:00Z</updated>
  </entry>
  <entry>
    <title>No rel link</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6b</id>
    <link href="https://example.org/plain"/>
    <published>2026-10-13T23:30:00-04:00</published>
    <updated>2026-10-12T00:00:00Z</updated>
  </entry>
</feed>"#;

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn entry(title: &str, published: Option<chrono::DateTime<Utc>>) -> FeedEntry {
        FeedEntry {
            title: title.into(),
            link: format!("https://example.com/{title}"),
            published,
            ..FeedEntry::default()
        }
    }

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].title, "比特幣站上 10 萬美元 - 動區動趨");
        assert_eq!(entries[0].link, "https://news.google.com/articles/one");
        assert_eq!(entries[0].published, Some(utc(2026, 10, 14, 2, 30)));

        assert!(entries[1].title.contains("ETF inflows surge"));
        assert_eq!(entries[1].published, Some(utc(2026, 10, 13, 9, 0)));

        assert_eq!(entries[2].title, "Miners & halving");
        assert!(entries[2].published.is_none());
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Atom entry");
        assert_eq!(entries[0].link, "https://example.org/2026/10/14/atom");
        assert_eq!(entries[0].updated, Some(utc(2026, 10, 14, 12, 0)));

        assert_eq!(entries[1].link, "https://example.org/plain");
        assert_eq!(entries[1].published, Some(utc(2026, 10, 14, 3, 30)));
    }

    #[test]
    fn test_parse_non_feed_is_error() {
        let err = parse_feed(b"<html><body><p>hello</p></body></html>").unwrap_err();
        assert!(matches!(err, DigestError::FeedParse(_)));
    }

    #[test]
    fn test_parse_malformed_xml() {
        let err = parse_feed(b"<rss><channel><item><title>x</channel></rss>").unwrap_err();
        assert!(matches!(err, DigestError::FeedParse(_)));
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("https://www.blocktempo.com").as_deref(), Some("blocktempo.com"));
        assert_eq!(source_label(" 動區動趨  BlockTempo ").as_deref(), Some("動區動趨 BlockTempo"));
        assert_eq!(source_label("  "), None);
    }

    #[test]
    fn test_entry_link_empty_without_links() {
        assert_eq!(entry_link(&[]), "");
    }

    #[test]
    fn test_filter_today_uses_local_timezone() {
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let entries = vec![
            // 17:00 UTC on the 13th is 01:00 on the 14th in Taipei.
            entry("late-utc", Some(utc(2026, 10, 13, 17, 0))),
            // 15:00 UTC on the 13th is still the 13th in Taipei.
            entry("early-utc", Some(utc(2026, 10, 13, 15, 0))),
            entry("undated", None),
        ];
        let items = filter_today(entries, &taipei, today);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["late-utc", "undated"]);
    }

    #[test]
    fn test_filter_today_falls_back_to_updated() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut stale = entry("stale", None);
        stale.updated = Some(utc(2026, 10, 1, 0, 0));
        let mut fresh = entry("fresh", None);
        fresh.updated = Some(utc(2026, 10, 14, 6, 0));
        let items = filter_today(vec![stale, fresh], &Utc, today);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "fresh");
    }

    #[test]
    fn test_filter_today_caps_in_feed_order() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut entries = vec![entry("old", Some(utc(2026, 10, 13, 12, 0)))];
        entries.extend((0..40).map(|i| entry(&format!("n{i}"), Some(utc(2026, 10, 14, 12, 0)))));
        let items = filter_today(entries, &Utc, today);
        assert_eq!(items.len(), MAX_ITEMS);
        assert_eq!(items[0].title, "n0");
        assert_eq!(items[MAX_ITEMS - 1].title, "n29");
    }

    #[test]
    fn test_rss_through_filter() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let items = filter_today(parse_feed(RSS.as_bytes()).unwrap(), &Utc, today);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["比特幣站上 10 萬美元 - 動區動趨", "Miners & halving"]);
    }

    #[tokio::test]
    async fn test_fetch_today_items_keeps_todays_entries() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>t</title><link>https://example.com</link><description>d</description>
  <item><title>fresh</title><link>https://example.com/fresh</link><pubDate>{}</pubDate></item>
  <item><title>stale</title><link>https://example.com/stale</link><pubDate>Tue, 01 Jan 2019 00:00:00 GMT</pubDate></item>
</channel></rss>"#,
            Utc::now().to_rfc2822()
        );
        let mock = server
            .mock("GET", "/rss")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(body)
            .create_async()
            .await;

        let items = fetch_today_items(&client(), &format!("{}/rss", server.url()))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "fresh");
        assert_eq!(items[0].link, "https://example.com/fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_today_items_http_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let err = fetch_today_items(&client(), &format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, DigestError::Http(_)));
        mock.assert_async().await;
    }
}
