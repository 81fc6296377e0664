// src/sources.rs
//! Monitored-source catalog, seeded from a TOML file at startup. The file is
//! declarative config; runtime source state (counters, activation) lives in
//! the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::model::{CredibilityLevel, PageConfig, Source, SourceKind};
use crate::store::Store;

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(rename = "source", default)]
    sources: Vec<SourceSpec>,
}

#[derive(Debug, Deserialize)]
struct SourceSpec {
    name: String,
    url: String,
    kind: SourceKind,
    credibility: CredibilityLevel,
    #[serde(default = "default_active")]
    active: bool,
    page: Option<PageConfig>,
}

fn default_active() -> bool {
    true
}

impl SourceSpec {
    fn into_source(self) -> Source {
        Source {
            id: 0,
            name: self.name,
            url: self.url,
            kind: self.kind,
            credibility: self.credibility,
            active: self.active,
            page_config: self.page,
            last_extraction: None,
            total_extracted: 0,
            total_submitted: 0,
        }
    }
}

/// Parse a sources file and register every entry. Returns how many were
/// seeded.
pub fn seed_from_file(store: &Arc<Store>, path: &str) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading sources file {path}"))?;
    let parsed: SourcesFile =
        toml::from_str(&raw).with_context(|| format!("parsing sources file {path}"))?;

    let count = parsed.sources.len();
    for spec in parsed.sources {
        let source = store.add_source(spec.into_source());
        info!(source = %source.name, kind = ?source.kind, "registered source");
    }
    Ok(count)
}
