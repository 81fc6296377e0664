// src/store.rs
//! In-memory document store. Stands in for the real persistence engine; the
//! pipeline only relies on the contract here: unique-constraint inserts on
//! normalized URL / content hash, status+extracted_at queries, transition
//! checked updates, and atomic source counters.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::model::{Content, ContentStatus, Source};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Unique index hit on normalized URL or content hash.
    #[error("duplicate content ({index})")]
    Duplicate { index: &'static str },
    #[error("no such record {id}")]
    NotFound { id: u64 },
    #[error("illegal status transition {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
}

#[derive(Default)]
struct Inner {
    sources: HashMap<u64, Source>,
    content: HashMap<u64, Content>,
    // Unique secondary indexes; both map to the content id.
    by_normalized_url: HashMap<String, u64>,
    by_content_hash: HashMap<String, u64>,
    next_source_id: u64,
    next_content_id: u64,
}

/// Shared store. All mutation happens under one lock, so an insert either
/// lands fully (record + both indexes) or not at all.
#[derive(Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub sources: usize,
    pub content_total: usize,
    pub pending: usize,
    pub submitted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- sources ----

    pub fn add_source(&self, mut source: Source) -> Source {
        let mut g = self.inner.write().expect("store lock poisoned");
        g.next_source_id += 1;
        source.id = g.next_source_id;
        g.sources.insert(source.id, source.clone());
        source
    }

    pub fn get_source(&self, id: u64) -> Option<Source> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .sources
            .get(&id)
            .cloned()
    }

    pub fn list_sources(&self) -> Vec<Source> {
        let g = self.inner.read().expect("store lock poisoned");
        let mut out: Vec<_> = g.sources.values().cloned().collect();
        out.sort_by_key(|s| s.id);
        out
    }

    pub fn active_sources(&self) -> Vec<Source> {
        self.list_sources().into_iter().filter(|s| s.active).collect()
    }

    /// Sources are never removed, only switched off.
    pub fn deactivate_source(&self, id: u64) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let src = g.sources.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        src.active = false;
        Ok(())
    }

    /// Record a finished extraction run: timestamp + extracted counter.
    pub fn record_extraction(&self, id: u64, extracted: u64) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let src = g.sources.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        src.last_extraction = Some(Utc::now());
        src.total_extracted += extracted;
        Ok(())
    }

    pub fn record_submitted(&self, id: u64) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let src = g.sources.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        src.total_submitted += 1;
        Ok(())
    }

    // ---- dedup gate probes (read-only) ----

    pub fn normalized_url_exists(&self, normalized_url: &str) -> bool {
        self.inner
            .read()
            .expect("store lock poisoned")
            .by_normalized_url
            .contains_key(normalized_url)
    }

    pub fn content_hash_exists(&self, hash: &str) -> bool {
        self.inner
            .read()
            .expect("store lock poisoned")
            .by_content_hash
            .contains_key(hash)
    }

    // ---- content ----

    /// Insert new content. Fails with `Duplicate` if either unique index is
    /// already taken; a racing duplicate therefore loses here rather than
    /// overwriting.
    pub fn insert_content(&self, mut content: Content) -> Result<Content, StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        if g.by_normalized_url.contains_key(&content.normalized_url) {
            return Err(StoreError::Duplicate { index: "normalized_url" });
        }
        if g.by_content_hash.contains_key(&content.content_hash) {
            return Err(StoreError::Duplicate { index: "content_hash" });
        }
        g.next_content_id += 1;
        content.id = g.next_content_id;
        g.by_normalized_url
            .insert(content.normalized_url.clone(), content.id);
        g.by_content_hash
            .insert(content.content_hash.clone(), content.id);
        g.content.insert(content.id, content.clone());
        Ok(content)
    }

    pub fn get_content(&self, id: u64) -> Option<Content> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .content
            .get(&id)
            .cloned()
    }

    pub fn delete_content(&self, id: u64) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let c = g.content.remove(&id).ok_or(StoreError::NotFound { id })?;
        g.by_normalized_url.remove(&c.normalized_url);
        g.by_content_hash.remove(&c.content_hash);
        Ok(())
    }

    /// Oldest-first selection by status, bounded.
    pub fn list_by_status(&self, status: ContentStatus, limit: usize) -> Vec<Content> {
        let g = self.inner.read().expect("store lock poisoned");
        let mut out: Vec<_> = g
            .content
            .values()
            .filter(|c| c.status == status)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.extracted_at);
        out.truncate(limit);
        out
    }

    pub fn list_content(&self, status: Option<ContentStatus>, limit: usize) -> Vec<Content> {
        match status {
            Some(s) => self.list_by_status(s, limit),
            None => {
                let g = self.inner.read().expect("store lock poisoned");
                let mut out: Vec<_> = g.content.values().cloned().collect();
                out.sort_by_key(|c| c.extracted_at);
                out.truncate(limit);
                out
            }
        }
    }

    /// `pending|failed -> submitted`: sets the verification-request id and
    /// clears any previous submission error, atomically with the status.
    pub fn set_submitted(&self, id: u64, vr_id: &str) -> Result<(), StoreError> {
        self.transition(id, ContentStatus::Submitted, |c| {
            c.verification_request_id = Some(vr_id.to_string());
            c.submission_error = None;
            c.submitted_at = Some(Utc::now());
        })
    }

    /// `pending|failed -> failed`: records the latest cause.
    pub fn set_failed(&self, id: u64, error: &str) -> Result<(), StoreError> {
        self.transition(id, ContentStatus::Failed, |c| {
            c.submission_error = Some(error.to_string());
        })
    }

    /// Audit path for items whose stored score fell under a raised threshold:
    /// re-marked rejected instead of submitted. Only reachable from pending.
    pub fn reject_below_threshold(&self, id: u64, reason: &str) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let c = g.content.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        if c.status != ContentStatus::Pending {
            return Err(StoreError::InvalidTransition {
                from: c.status.as_str(),
                to: ContentStatus::Rejected.as_str(),
            });
        }
        c.status = ContentStatus::Rejected;
        c.submission_error = Some(reason.to_string());
        Ok(())
    }

    fn transition(
        &self,
        id: u64,
        to: ContentStatus,
        apply: impl FnOnce(&mut Content),
    ) -> Result<(), StoreError> {
        let mut g = self.inner.write().expect("store lock poisoned");
        let c = g.content.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        if !c.status.can_transition(to) {
            return Err(StoreError::InvalidTransition {
                from: c.status.as_str(),
                to: to.as_str(),
            });
        }
        c.status = to;
        apply(c);
        Ok(())
    }

    pub fn stats(&self) -> StoreStats {
        let g = self.inner.read().expect("store lock poisoned");
        let count = |s: ContentStatus| g.content.values().filter(|c| c.status == s).count();
        StoreStats {
            sources: g.sources.len(),
            content_total: g.content.len(),
            pending: count(ContentStatus::Pending),
            submitted: count(ContentStatus::Submitted),
            rejected: count(ContentStatus::Rejected),
            failed: count(ContentStatus::Failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CredibilityLevel, SourceKind};

    fn content(url: &str, hash: &str, status: ContentStatus) -> Content {
        Content {
            id: 0,
            source_id: 1,
            source_name: "Test".into(),
            credibility: CredibilityLevel::Low,
            title: "t".into(),
            body: "b".into(),
            url: url.into(),
            normalized_url: url.into(),
            content_hash: hash.into(),
            published_at: None,
            extracted_at: Utc::now(),
            score: 40,
            status,
            verification_request_id: None,
            submission_error: None,
            submitted_at: None,
        }
    }

    fn source() -> Source {
        Source {
            id: 0,
            name: "Test".into(),
            url: "https://example.com/feed".into(),
            kind: SourceKind::Feed,
            credibility: CredibilityLevel::Low,
            active: true,
            page_config: None,
            last_extraction: None,
            total_extracted: 0,
            total_submitted: 0,
        }
    }

    #[test]
    fn duplicate_url_insert_fails_without_side_effects() {
        let store = Store::new();
        store
            .insert_content(content("https://a.com/x", "h1", ContentStatus::Pending))
            .unwrap();
        let err = store
            .insert_content(content("https://a.com/x", "h2", ContentStatus::Pending))
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate { index: "normalized_url" });
        // Losing insert must not have claimed its hash.
        assert!(!store.content_hash_exists("h2"));
    }

    #[test]
    fn duplicate_hash_insert_fails() {
        let store = Store::new();
        store
            .insert_content(content("https://a.com/x", "h1", ContentStatus::Pending))
            .unwrap();
        let err = store
            .insert_content(content("https://a.com/y", "h1", ContentStatus::Pending))
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate { index: "content_hash" });
    }

    #[test]
    fn submitted_is_not_reachable_from_rejected() {
        let store = Store::new();
        let c = store
            .insert_content(content("https://a.com/x", "h1", ContentStatus::Rejected))
            .unwrap();
        let err = store.set_submitted(c.id, "vr-1").unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[test]
    fn failed_retry_path_reaches_submitted() {
        let store = Store::new();
        let c = store
            .insert_content(content("https://a.com/x", "h1", ContentStatus::Pending))
            .unwrap();
        store.set_failed(c.id, "timeout").unwrap();
        store.set_failed(c.id, "5xx").unwrap(); // failed -> failed, latest cause wins
        assert_eq!(
            store.get_content(c.id).unwrap().submission_error.as_deref(),
            Some("5xx")
        );
        store.set_submitted(c.id, "vr-9").unwrap();
        let got = store.get_content(c.id).unwrap();
        assert_eq!(got.status, ContentStatus::Submitted);
        assert_eq!(got.verification_request_id.as_deref(), Some("vr-9"));
        assert!(got.submission_error.is_none());
    }

    #[test]
    fn list_by_status_is_oldest_first_and_bounded() {
        let store = Store::new();
        for i in 0..5 {
            let mut c = content(&format!("https://a.com/{i}"), &format!("h{i}"), ContentStatus::Pending);
            c.extracted_at = Utc::now() - chrono::Duration::seconds(100 - i);
            store.insert_content(c).unwrap();
        }
        let got = store.list_by_status(ContentStatus::Pending, 3);
        assert_eq!(got.len(), 3);
        assert!(got.windows(2).all(|w| w[0].extracted_at <= w[1].extracted_at));
    }

    #[test]
    fn source_counters_accumulate() {
        let store = Store::new();
        let s = store.add_source(source());
        store.record_extraction(s.id, 3).unwrap();
        store.record_extraction(s.id, 2).unwrap();
        store.record_submitted(s.id).unwrap();
        let got = store.get_source(s.id).unwrap();
        assert_eq!(got.total_extracted, 5);
        assert_eq!(got.total_submitted, 1);
        assert!(got.last_extraction.is_some());
    }
}
