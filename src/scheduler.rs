// src/scheduler.rs
//! Periodic driver: one extraction batch per tick, followed by a submission
//! batch when auto-submit is on. A tick that overruns the interval skips the
//! missed fire instead of bursting.

use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use crate::auth::TokenExchange;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::store::Store;
use crate::submit::SubmissionService;

pub fn spawn<E: TokenExchange + 'static>(
    store: Arc<Store>,
    pipeline: Arc<Pipeline>,
    submitter: Arc<SubmissionService<E>>,
    settings: Settings,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(settings.extraction_interval_minutes.max(1) * 60);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval() fires immediately; the first extraction runs at startup.
        info!(
            interval_minutes = settings.extraction_interval_minutes,
            auto_submit = settings.auto_submit_enabled,
            "scheduler running"
        );

        loop {
            ticker.tick().await;
            run_tick(&store, &pipeline, &submitter, &settings).await;
        }
    })
}

/// One scheduler cycle: extraction, then the submission batch when
/// auto-submit is on. Pending items may predate this tick (earlier failures,
/// duplicate-only runs), so submission never depends on what extraction just
/// saved.
pub async fn run_tick<E: TokenExchange>(
    store: &Arc<Store>,
    pipeline: &Arc<Pipeline>,
    submitter: &SubmissionService<E>,
    settings: &Settings,
) {
    pipeline.run_batch(settings).await;
    if settings.auto_submit_enabled {
        submitter.submit_batch(store, settings, false).await;
    }
}
