// src/dedup.rs
//! Two-stage deduplication gate: normalized-URL lookup first (the cheap
//! short-circuit that catches most repeats), content hash second. The gate
//! only reads; admission side effects belong to the caller.

use sha2::{Digest, Sha256};
use url::Url;

use crate::model::ExtractedItem;
use crate::store::Store;

/// Query parameters that vary per click without changing the article.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
    "msclkid",
    "ref",
    "source",
    "campaign",
    "_ga",
    "_gl",
];

/// Canonical form of an article URL: https upgrade, tracking params removed,
/// remaining query pairs sorted, fragment and trailing slash stripped.
/// Unparseable input comes back unchanged so it still deduplicates exactly.
pub fn normalize_url(raw: &str) -> String {
    let mut parsed = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => return raw.to_string(),
    };

    if parsed.scheme() == "http" {
        // Most news sites serve https; the upgrade folds both spellings.
        let _ = parsed.set_scheme("https");
    }

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.to_ascii_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        let q = pairs
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k.clone()
                } else {
                    format!("{k}={v}")
                }
            })
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&q));
    }
    parsed.set_fragment(None);

    let mut out = parsed.to_string();
    if out.ends_with('/') && parsed.path() != "/" {
        out.pop();
    }
    out
}

/// Stable SHA-256 over `url | whitespace-normalized body`, hex-encoded.
/// Catches the same article reposted under a different URL.
pub fn content_hash(url: &str, body: &str) -> String {
    let normalized_body = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized_body.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// New item; derived keys handed to the caller for the insert.
    Admitted {
        normalized_url: String,
        content_hash: String,
    },
    Duplicate,
}

/// Check an extracted item against the store. URL probe runs before any
/// hashing so duplicate URLs cost a single lookup.
pub fn admit(store: &Store, item: &ExtractedItem) -> GateDecision {
    let normalized_url = normalize_url(&item.url);
    if store.normalized_url_exists(&normalized_url) {
        return GateDecision::Duplicate;
    }
    let hash = content_hash(&item.url, &item.body);
    if store.content_hash_exists(&hash) {
        return GateDecision::Duplicate;
    }
    GateDecision::Admitted {
        normalized_url,
        content_hash: hash,
    }
}
