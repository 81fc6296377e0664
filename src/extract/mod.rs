// src/extract/mod.rs
//! Source-polymorphic extraction. One capability trait, a fixed set of
//! variants selected by `SourceKind`; adding a kind means adding a variant
//! here and nothing downstream changes.

pub mod feed;
pub mod page;

use async_trait::async_trait;
use reqwest::Client;

use crate::model::{ExtractedItem, Source, SourceKind};

pub const USER_AGENT: &str = "claimwatch/0.1 (+monitoring)";
pub const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Network failure, timeout, or non-2xx response.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// Document-level decode failure. Malformed individual entries are
    /// skipped by the extractors, not reported here.
    #[error("parse failed for {url}: {reason}")]
    Parse { url: String, reason: String },
}

#[async_trait]
pub trait Extract: Send + Sync {
    async fn extract(&self, source: &Source) -> Result<Vec<ExtractedItem>, ExtractError>;
}

/// Tagged-union dispatch over the extractor variants.
pub enum Extractor {
    Feed(feed::FeedExtractor),
    Page(page::PageExtractor),
}

impl Extractor {
    pub fn for_kind(kind: SourceKind, client: Client) -> Self {
        match kind {
            SourceKind::Feed => Extractor::Feed(feed::FeedExtractor::new(client)),
            SourceKind::Page => Extractor::Page(page::PageExtractor::new(client)),
        }
    }
}

#[async_trait]
impl Extract for Extractor {
    async fn extract(&self, source: &Source) -> Result<Vec<ExtractedItem>, ExtractError> {
        match self {
            Extractor::Feed(e) => e.extract(source).await,
            Extractor::Page(e) => e.extract(source).await,
        }
    }
}

/// Shared HTTP client for all outbound fetches. Per-call timeout so a stalled
/// source cannot hold a worker indefinitely.
pub fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, ExtractError> {
    let resp = client.get(url).send().await.map_err(|e| ExtractError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !resp.status().is_success() {
        return Err(ExtractError::Fetch {
            url: url.to_string(),
            reason: format!("status {}", resp.status()),
        });
    }
    resp.text().await.map_err(|e| ExtractError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Normalize article text: HTML entity decode, tag strip, typographic quote
/// folding, whitespace collapse, 1500-char cap.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}
