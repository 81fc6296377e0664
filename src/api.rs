// src/api.rs
//! Operator HTTP surface: source catalog CRUD, content inspection, manual
//! pipeline triggers, and counters. The scheduler drives the same pipeline;
//! these routes exist for operations and debugging.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::auth::TokenExchange;
use crate::config::Settings;
use crate::model::{Content, ContentStatus, CredibilityLevel, PageConfig, Source, SourceKind};
use crate::pipeline::{ExtractionReport, Pipeline};
use crate::store::{Store, StoreError, StoreStats};
use crate::submit::{SubmissionReport, SubmissionService};

pub struct AppState<E> {
    pub store: Arc<Store>,
    pub pipeline: Arc<Pipeline>,
    pub submitter: Arc<SubmissionService<E>>,
    pub settings: Settings,
}

impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            pipeline: self.pipeline.clone(),
            submitter: self.submitter.clone(),
            settings: self.settings.clone(),
        }
    }
}

pub fn create_router<E: TokenExchange + 'static>(state: AppState<E>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/sources", get(list_sources).post(create_source))
        .route("/sources/{id}", get(get_source).delete(deactivate_source))
        .route("/content", get(list_content))
        .route("/content/{id}", get(get_content).delete(delete_content))
        .route("/extract", post(trigger_extraction))
        .route("/submit", post(trigger_submission))
        .route("/submit/{id}", post(submit_single))
        .route("/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn store_error(e: StoreError) -> ApiError {
    let status = match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Duplicate { .. } | StoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
    };
    (status, e.to_string())
}

// ---- sources ----

#[derive(serde::Deserialize)]
struct NewSource {
    name: String,
    url: String,
    kind: SourceKind,
    credibility: CredibilityLevel,
    #[serde(default)]
    page: Option<PageConfig>,
}

async fn list_sources<E: TokenExchange>(State(state): State<AppState<E>>) -> Json<Vec<Source>> {
    Json(state.store.list_sources())
}

async fn create_source<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Json(body): Json<NewSource>,
) -> (StatusCode, Json<Source>) {
    let source = state.store.add_source(Source {
        id: 0,
        name: body.name,
        url: body.url,
        kind: body.kind,
        credibility: body.credibility,
        active: true,
        page_config: body.page,
        last_extraction: None,
        total_extracted: 0,
        total_submitted: 0,
    });
    (StatusCode::CREATED, Json(source))
}

async fn get_source<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Path(id): Path<u64>,
) -> Result<Json<Source>, ApiError> {
    state
        .store
        .get_source(id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no such source {id}")))
}

async fn deactivate_source<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.store.deactivate_source(id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- content ----

#[derive(serde::Deserialize)]
struct ContentQuery {
    status: Option<String>,
    limit: Option<usize>,
}

async fn list_content<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Query(q): Query<ContentQuery>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let status = match q.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<ContentStatus>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e))?,
        ),
        None => None,
    };
    let limit = q.limit.unwrap_or(100).min(1000);
    Ok(Json(state.store.list_content(status, limit)))
}

async fn get_content<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Path(id): Path<u64>,
) -> Result<Json<Content>, ApiError> {
    state
        .store
        .get_content(id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no such content {id}")))
}

async fn delete_content<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_content(id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- pipeline triggers ----

async fn trigger_extraction<E: TokenExchange>(
    State(state): State<AppState<E>>,
) -> Json<ExtractionReport> {
    Json(state.pipeline.run_batch(&state.settings).await)
}

#[derive(serde::Deserialize)]
struct SubmitQuery {
    /// Also retry items stuck in `failed`.
    #[serde(default)]
    include_failed: bool,
}

async fn trigger_submission<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Query(q): Query<SubmitQuery>,
) -> Json<SubmissionReport> {
    Json(
        state
            .submitter
            .submit_batch(&state.store, &state.settings, q.include_failed)
            .await,
    )
}

/// Submit exactly one item. Only `pending` and `failed` are submittable;
/// anything else is a state conflict.
async fn submit_single<E: TokenExchange>(
    State(state): State<AppState<E>>,
    Path(id): Path<u64>,
) -> Result<Json<Content>, ApiError> {
    let content = state
        .store
        .get_content(id)
        .ok_or((StatusCode::NOT_FOUND, format!("no such content {id}")))?;

    if !matches!(content.status, ContentStatus::Pending | ContentStatus::Failed) {
        return Err((
            StatusCode::CONFLICT,
            format!("content {id} is {}, not submittable", content.status.as_str()),
        ));
    }

    match state.submitter.submit_one(&content).await {
        Ok(vr_id) => {
            state.store.set_submitted(id, &vr_id).map_err(store_error)?;
            let _ = state.store.record_submitted(content.source_id);
        }
        Err(e) => {
            state.store.set_failed(id, &e.to_string()).map_err(store_error)?;
            return Err((StatusCode::BAD_GATEWAY, e.to_string()));
        }
    }
    // Freshly transitioned; the record must still exist.
    state
        .store
        .get_content(id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no such content {id}")))
}

async fn stats<E: TokenExchange>(State(state): State<AppState<E>>) -> Json<StoreStats> {
    Json(state.store.stats())
}
