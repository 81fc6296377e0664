// src/model.rs
//! Core records: monitored sources, extracted items, and persisted content
//! with its lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator-assigned trust tier. Inversely weighted by the pre-filter:
/// low-credibility sources are the ones worth watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityLevel {
    Low,
    Medium,
    High,
}

/// How a source is extracted. Adding a kind means adding an extractor
/// variant; the gate and scorer never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Page,
}

/// CSS selectors for page-kind sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Selector for one article block on the listing page.
    #[serde(default = "default_item_selector")]
    pub item: String,
    #[serde(default = "default_title_selector")]
    pub title: String,
    #[serde(default = "default_excerpt_selector")]
    pub excerpt: String,
    #[serde(default = "default_link_selector")]
    pub link: String,
    /// Prepended to relative hrefs, e.g. "https://example.com".
    #[serde(default)]
    pub url_prefix: String,
}

fn default_item_selector() -> String {
    "article".to_string()
}
fn default_title_selector() -> String {
    "h3".to_string()
}
fn default_excerpt_selector() -> String {
    "p".to_string()
}
fn default_link_selector() -> String {
    "a".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            title: default_title_selector(),
            excerpt: default_excerpt_selector(),
            link: default_link_selector(),
            url_prefix: String::new(),
        }
    }
}

/// A monitored origin (feed URL or listing page). Never deleted implicitly;
/// `active = false` is the only retirement path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: u64,
    pub name: String,
    /// Feed URL or page URL depending on `kind`.
    pub url: String,
    pub kind: SourceKind,
    pub credibility: CredibilityLevel,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub page_config: Option<PageConfig>,
    #[serde(default)]
    pub last_extraction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_extracted: u64,
    #[serde(default)]
    pub total_submitted: u64,
}

fn default_true() -> bool {
    true
}

/// Raw item produced by an extractor. Lives only between extraction and the
/// dedup gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    pub title: String,
    pub body: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of admitted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Pending,
    Submitted,
    Rejected,
    Failed,
}

impl ContentStatus {
    /// The full transition graph. `submitted` is reachable only from
    /// `pending` or `failed`; `rejected` and `submitted` are terminal.
    pub fn can_transition(self, to: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, to),
            (Pending, Submitted) | (Pending, Failed) | (Failed, Submitted) | (Failed, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Submitted => "submitted",
            ContentStatus::Rejected => "rejected",
            ContentStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ContentStatus::Pending),
            "submitted" => Ok(ContentStatus::Submitted),
            "rejected" => Ok(ContentStatus::Rejected),
            "failed" => Ok(ContentStatus::Failed),
            other => Err(format!("unknown content status '{other}'")),
        }
    }
}

/// Persisted article admitted past the dedup gate.
///
/// Invariants enforced by the store: `normalized_url` and `content_hash` are
/// unique, `verification_request_id` is set iff status is `submitted`, and
/// status only moves along `ContentStatus::can_transition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: u64,
    pub source_id: u64,
    pub source_name: String,
    pub credibility: CredibilityLevel,
    pub title: String,
    pub body: String,
    pub url: String,
    pub normalized_url: String,
    pub content_hash: String,
    pub published_at: Option<DateTime<Utc>>,
    pub extracted_at: DateTime<Utc>,
    /// Pre-filter score in [0, 60].
    pub score: u8,
    pub status: ContentStatus,
    pub verification_request_id: Option<String>,
    pub submission_error: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}
