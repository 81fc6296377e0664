// src/pipeline.rs
//! Extraction pipeline: fan out over active sources under a concurrency
//! bound, then run each item through the dedup gate, the pre-filter, and the
//! store. One bad source never aborts the batch.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn};

use crate::config::Settings;
use crate::dedup::{self, GateDecision};
use crate::extract::{build_client, Extract, Extractor};
use crate::model::{Content, ContentStatus, ExtractedItem, Source};
use crate::prefilter::{self, distill, Verdict};
use crate::store::{Store, StoreError};

/// Per-batch outcome counts, also returned by the manual trigger endpoint.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ExtractionReport {
    pub sources_run: usize,
    pub sources_failed: usize,
    pub items_seen: usize,
    pub duplicates: usize,
    pub dropped: usize,
    pub saved_pending: usize,
    pub saved_rejected: usize,
}

pub struct Pipeline {
    store: Arc<Store>,
    client: reqwest::Client,
    extraction_bound: Arc<Semaphore>,
    // One mutex per source id so overlapping ticks never run the same source
    // twice concurrently.
    source_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl Pipeline {
    pub fn new(store: Arc<Store>, settings: &Settings) -> Self {
        Self {
            store,
            client: build_client(),
            extraction_bound: Arc::new(Semaphore::new(settings.max_concurrent_extractions.max(1))),
            source_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, source_id: u64) -> Arc<Mutex<()>> {
        let mut locks = self.source_locks.lock().await;
        locks.entry(source_id).or_default().clone()
    }

    /// Run one extraction batch over every active source.
    pub async fn run_batch(self: &Arc<Self>, settings: &Settings) -> ExtractionReport {
        let sources = self.store.active_sources();
        let mut report = ExtractionReport::default();

        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let this = self.clone();
            let settings = settings.clone();
            handles.push(tokio::spawn(async move {
                let _permit = this
                    .extraction_bound
                    .clone()
                    .acquire_owned()
                    .await
                    .expect("extraction semaphore closed");
                let guard = this.lock_for(source.id).await;
                let _serial = guard.lock().await;
                this.run_source(&source, &settings).await
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(Ok(src_report)) => {
                    report.sources_run += 1;
                    report.items_seen += src_report.items_seen;
                    report.duplicates += src_report.duplicates;
                    report.dropped += src_report.dropped;
                    report.saved_pending += src_report.saved_pending;
                    report.saved_rejected += src_report.saved_rejected;
                }
                Ok(Err(())) => {
                    report.sources_run += 1;
                    report.sources_failed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "extraction task panicked");
                    report.sources_failed += 1;
                }
            }
        }

        info!(
            sources = report.sources_run,
            failed = report.sources_failed,
            seen = report.items_seen,
            pending = report.saved_pending,
            rejected = report.saved_rejected,
            duplicates = report.duplicates,
            dropped = report.dropped,
            "extraction batch complete"
        );
        report
    }

    /// Extract one source and admit its items. The error carries no payload;
    /// the cause is already logged and counted where it happened.
    async fn run_source(
        &self,
        source: &Source,
        settings: &Settings,
    ) -> Result<ExtractionReport, ()> {
        let extractor = Extractor::for_kind(source.kind, self.client.clone());
        let items = match extractor.extract(source).await {
            Ok(items) => items,
            Err(e) => {
                counter!("extraction_failed_total").increment(1);
                warn!(source = %source.name, error = %e, "extraction failed");
                return Err(());
            }
        };

        let mut report = ExtractionReport {
            items_seen: items.len(),
            ..Default::default()
        };
        let mut admitted = 0u64;

        for item in items {
            match self.admit_item(source, item, settings) {
                ItemOutcome::Duplicate => report.duplicates += 1,
                ItemOutcome::Dropped => report.dropped += 1,
                ItemOutcome::Saved(ContentStatus::Pending) => {
                    admitted += 1;
                    report.saved_pending += 1;
                }
                ItemOutcome::Saved(_) => {
                    admitted += 1;
                    report.saved_rejected += 1;
                }
            }
        }

        if let Err(e) = self.store.record_extraction(source.id, admitted) {
            warn!(source = %source.name, error = %e, "could not record extraction run");
        }
        counter!("extraction_success_total").increment(1);
        counter!("content_saved_total").increment(admitted);
        Ok(report)
    }

    fn admit_item(
        &self,
        source: &Source,
        item: ExtractedItem,
        settings: &Settings,
    ) -> ItemOutcome {
        // Distill to the checkable core before hashing, so reorderings of the
        // same boilerplate still collide. Items with no checkable text, or
        // not in Portuguese, never reach the gate.
        let Some(body) = distill::distill(&item.body) else {
            counter!("distill_dropped_total").increment(1);
            return ItemOutcome::Dropped;
        };
        if !distill::looks_portuguese(&body) {
            counter!("language_dropped_total").increment(1);
            return ItemOutcome::Dropped;
        }
        let item = ExtractedItem { body, ..item };

        let (normalized_url, content_hash) =
            match dedup::admit(&self.store, &item) {
                GateDecision::Duplicate => {
                    counter!("dedup_duplicate_total").increment(1);
                    return ItemOutcome::Duplicate;
                }
                GateDecision::Admitted {
                    normalized_url,
                    content_hash,
                } => (normalized_url, content_hash),
            };

        // Title and body are scored together; a checkable headline counts
        // even over a thin body.
        let breakdown = prefilter::score(
            &format!("{} {}", item.title, item.body),
            source.credibility,
        );
        let status = match Verdict::from_score(
            breakdown.total,
            settings.minimum_save_score,
            settings.submission_score_threshold,
        ) {
            Verdict::Drop => {
                counter!("prefilter_dropped_total").increment(1);
                return ItemOutcome::Dropped;
            }
            Verdict::Rejected => ContentStatus::Rejected,
            Verdict::Pending => ContentStatus::Pending,
        };

        let content = Content {
            id: 0,
            source_id: source.id,
            source_name: source.name.clone(),
            credibility: source.credibility,
            title: item.title,
            body: item.body,
            url: item.url,
            normalized_url,
            content_hash,
            published_at: item.published_at,
            extracted_at: Utc::now(),
            score: breakdown.total,
            status,
            verification_request_id: None,
            submission_error: None,
            submitted_at: None,
        };

        match self.store.insert_content(content) {
            Ok(_) => ItemOutcome::Saved(status),
            // Lost the race against a concurrent insert of the same item.
            Err(StoreError::Duplicate { .. }) => {
                counter!("dedup_duplicate_total").increment(1);
                ItemOutcome::Duplicate
            }
            Err(e) => {
                warn!(source = %source.name, error = %e, "insert failed");
                ItemOutcome::Dropped
            }
        }
    }
}

enum ItemOutcome {
    Duplicate,
    Dropped,
    Saved(ContentStatus),
}
