//! Claimwatch — Binary Entrypoint
//! Boots the monitoring service: source catalog, extraction scheduler, and
//! the operator HTTP API.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use claimwatch::api::{create_router, AppState};
use claimwatch::auth::{OryExchange, TokenManager};
use claimwatch::config::Settings;
use claimwatch::metrics::Metrics;
use claimwatch::pipeline::Pipeline;
use claimwatch::store::Store;
use claimwatch::submit::SubmissionService;
use claimwatch::{scheduler, sources};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimwatch=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    let metrics = Metrics::init(settings.extraction_interval_minutes);

    let store = Arc::new(Store::new());
    match sources::seed_from_file(&store, &settings.sources_path) {
        Ok(n) => info!(count = n, path = %settings.sources_path, "seeded sources"),
        Err(e) => warn!(error = %e, "no sources seeded, catalog starts empty"),
    }

    let pipeline = Arc::new(Pipeline::new(store.clone(), &settings));
    let tokens = TokenManager::new(OryExchange::new(
        &settings.oauth_token_url,
        &settings.oauth_client_id,
        &settings.oauth_client_secret,
        &settings.oauth_scope,
    ));
    let submitter = Arc::new(SubmissionService::new(&settings, tokens));

    scheduler::spawn(
        store.clone(),
        pipeline.clone(),
        submitter.clone(),
        settings.clone(),
    );

    let state = AppState {
        store,
        pipeline,
        submitter,
        settings: settings.clone(),
    };
    let router = create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, router).await.context("server exited")?;
    Ok(())
}
