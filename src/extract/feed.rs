// src/extract/feed.rs
//! Feed-kind extractor: RSS 2.0 and Atom via quick-xml serde decoding.
//! Malformed entries are skipped one by one; only a document-level failure
//! surfaces as an error for the source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::model::{ExtractedItem, Source};

use super::{fetch_text, normalize_text, Extract, ExtractError};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

pub struct FeedExtractor {
    client: Client,
}

impl FeedExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extract for FeedExtractor {
    async fn extract(&self, source: &Source) -> Result<Vec<ExtractedItem>, ExtractError> {
        let body = fetch_text(&self.client, &source.url).await?;
        parse_feed(&body, &source.url)
    }
}

/// Decode a feed document, RSS first, Atom as fallback.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<ExtractedItem>, ExtractError> {
    let clean = scrub_html_entities_for_xml(xml);

    if let Ok(rss) = from_str::<Rss>(&clean) {
        return Ok(rss.channel.items.into_iter().filter_map(rss_item).collect());
    }
    match from_str::<AtomFeed>(&clean) {
        Ok(feed) => Ok(feed.entries.into_iter().filter_map(atom_entry).collect()),
        Err(e) => Err(ExtractError::Parse {
            url: feed_url.to_string(),
            reason: format!("not rss or atom: {e}"),
        }),
    }
}

fn rss_item(it: RssItem) -> Option<ExtractedItem> {
    let url = it.link.filter(|l| !l.trim().is_empty())?;
    let title = normalize_text(it.title.as_deref().unwrap_or_default());
    if title.is_empty() {
        return None;
    }
    let body = normalize_text(
        it.content_encoded
            .as_deref()
            .or(it.description.as_deref())
            .unwrap_or_default(),
    );
    if body.is_empty() {
        return None;
    }
    Some(ExtractedItem {
        title,
        body,
        url: url.trim().to_string(),
        published_at: it.pub_date.as_deref().and_then(parse_rfc2822),
    })
}

fn atom_entry(entry: AtomEntry) -> Option<ExtractedItem> {
    let url = entry
        .links
        .into_iter()
        .find_map(|l| l.href)
        .filter(|h| !h.trim().is_empty())?;
    let title = normalize_text(entry.title.as_deref().unwrap_or_default());
    if title.is_empty() {
        return None;
    }
    let body = normalize_text(
        entry
            .content
            .as_deref()
            .or(entry.summary.as_deref())
            .unwrap_or_default(),
    );
    if body.is_empty() {
        return None;
    }
    let published = entry.published.or(entry.updated);
    Some(ExtractedItem {
        title,
        body,
        url: url.trim().to_string(),
        published_at: published.as_deref().and_then(parse_rfc3339),
    })
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let odt = OffsetDateTime::parse(ts, &Rfc2822).ok()?;
    DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), 0)
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// quick-xml rejects HTML-only entities inside feed payloads.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Teste</title>
  <item>
    <title>Governo anuncia programa</title>
    <link>https://noticias.example/a?utm_source=rss</link>
    <pubDate>Tue, 14 Jan 2025 10:00:00 +0000</pubDate>
    <description>O governo confirmou que 23% da popula&#231;&#227;o foi vacinada.</description>
  </item>
  <item>
    <title>Sem link</title>
    <description>entrada quebrada</description>
  </item>
  <item>
    <link>https://noticias.example/b</link>
    <pubDate>not a date</pubDate>
    <title>Sem corpo</title>
  </item>
</channel></rss>"#;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Teste</title>
  <entry>
    <title>Estudo aponta queda</title>
    <link href="https://atom.example/x"/>
    <published>2025-01-14T10:00:00Z</published>
    <summary>Segundo o estudo, a taxa caiu 12%.</summary>
  </entry>
</feed>"#;

    #[test]
    fn rss_entries_decode_and_broken_ones_are_skipped() {
        let items = parse_feed(RSS_FIXTURE, "https://noticias.example/rss").unwrap();
        assert_eq!(items.len(), 1);
        let it = &items[0];
        assert_eq!(it.title, "Governo anuncia programa");
        assert!(it.body.contains("23% da população"));
        assert_eq!(it.url, "https://noticias.example/a?utm_source=rss");
        assert!(it.published_at.is_some());
    }

    #[test]
    fn atom_entries_decode() {
        let items = parse_feed(ATOM_FIXTURE, "https://atom.example/feed").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://atom.example/x");
        assert!(items[0].published_at.is_some());
    }

    #[test]
    fn unparseable_document_is_a_parse_error() {
        let err = parse_feed("this is not xml at all", "https://x.example/feed").unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));
    }

    #[test]
    fn bad_entry_date_does_not_kill_the_entry() {
        let xml = r#"<rss><channel><item>
            <title>t</title><link>https://a.example/1</link>
            <pubDate>garbage</pubDate><description>corpo da notícia</description>
        </item></channel></rss>"#;
        let items = parse_feed(xml, "u").unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].published_at.is_none());
    }
}
