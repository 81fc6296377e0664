// src/extract/page.rs
//! Page-kind extractor: one static HTML listing page, per-source CSS
//! selectors from `PageConfig`. Article blocks that miss a link or title are
//! skipped individually.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::model::{ExtractedItem, PageConfig, Source};

use super::{fetch_text, normalize_text, Extract, ExtractError};

pub struct PageExtractor {
    client: Client,
}

impl PageExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extract for PageExtractor {
    async fn extract(&self, source: &Source) -> Result<Vec<ExtractedItem>, ExtractError> {
        let cfg = source.page_config.clone().unwrap_or_default();
        let html = fetch_text(&self.client, &source.url).await?;
        parse_page(&html, &cfg, &source.url)
    }
}

/// Pull article blocks out of a listing page. Pages carry no reliable
/// publication date, so `published_at` stays empty.
pub fn parse_page(
    html: &str,
    cfg: &PageConfig,
    page_url: &str,
) -> Result<Vec<ExtractedItem>, ExtractError> {
    let item_sel = selector(&cfg.item, page_url)?;
    let title_sel = selector(&cfg.title, page_url)?;
    let excerpt_sel = selector(&cfg.excerpt, page_url)?;
    let link_sel = selector(&cfg.link, page_url)?;

    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for element in doc.select(&item_sel) {
        let Some(href) = find_href(element, &link_sel) else {
            continue;
        };
        let Some(url) = resolve_href(&href, &cfg.url_prefix) else {
            continue;
        };

        let title = element
            .select(&title_sel)
            .next()
            .map(|t| normalize_text(&t.text().collect::<String>()))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        // Listing excerpts are short; fall back to the headline.
        let body = element
            .select(&excerpt_sel)
            .next()
            .map(|e| normalize_text(&e.text().collect::<String>()))
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| title.clone());

        out.push(ExtractedItem {
            title,
            body,
            url,
            published_at: None,
        });
    }
    Ok(out)
}

fn selector(css: &str, page_url: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Parse {
        url: page_url.to_string(),
        reason: format!("bad selector '{css}': {e}"),
    })
}

/// The block itself may be the anchor.
fn find_href(element: ElementRef<'_>, link_sel: &Selector) -> Option<String> {
    if element.value().name() == "a" {
        return element.value().attr("href").map(str::to_string);
    }
    element
        .select(link_sel)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

fn resolve_href(href: &str, url_prefix: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if url_prefix.is_empty() {
        return None;
    }
    let prefix = url_prefix.trim_end_matches('/');
    if href.starts_with('/') {
        Some(format!("{prefix}{href}"))
    } else {
        Some(format!("{prefix}/{href}"))
    }
}
