// tests/api_http.rs
//
// HTTP-level tests for the operator API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /sources + GET /sources + DELETE /sources/{id}
// - GET /content (including a bad status filter)
// - POST /extract with an empty catalog
// - POST /submit/{id} state handling
// - GET /stats

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use claimwatch::auth::{AuthError, IssuedToken, TokenExchange, TokenManager};
use claimwatch::api::{create_router, AppState};
use claimwatch::config::Settings;
use claimwatch::model::{Content, ContentStatus, CredibilityLevel};
use claimwatch::pipeline::Pipeline;
use claimwatch::store::Store;
use claimwatch::submit::SubmissionService;

const BODY_LIMIT: usize = 1024 * 1024;

/// Token exchange that always succeeds, so no test touches an OAuth server.
struct StaticExchange;

#[async_trait]
impl TokenExchange for StaticExchange {
    async fn exchange(&self) -> Result<IssuedToken, AuthError> {
        Ok(IssuedToken {
            access_token: "test-token".to_string(),
            expires_in: std::time::Duration::from_secs(3600),
        })
    }
}

/// Build the same Router the binary uses, backed by a fresh store and an
/// unroutable verification endpoint.
fn test_app() -> (Router, Arc<Store>) {
    let settings = Settings {
        verify_base_url: "http://127.0.0.1:9".to_string(),
        ..Settings::default()
    };
    let store = Arc::new(Store::new());
    let pipeline = Arc::new(Pipeline::new(store.clone(), &settings));
    let submitter = Arc::new(SubmissionService::new(&settings, TokenManager::new(StaticExchange)));
    let state = AppState {
        store: store.clone(),
        pipeline,
        submitter,
        settings,
    };
    (create_router(state), store)
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn pending_content(url: &str, status: ContentStatus) -> Content {
    Content {
        id: 0,
        source_id: 1,
        source_name: "Teste".into(),
        credibility: CredibilityLevel::Low,
        title: "t".into(),
        body: "O governo confirmou que 23% da população foi vacinada".into(),
        url: url.into(),
        normalized_url: url.into(),
        content_hash: format!("hash-{url}"),
        published_at: None,
        extracted_at: Utc::now(),
        score: 40,
        status,
        verification_request_id: None,
        submission_error: None,
        submitted_at: None,
    }
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let (app, _) = test_app();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    assert_eq!(std::str::from_utf8(&bytes).unwrap().trim(), "ok");
}

#[tokio::test]
async fn source_create_list_deactivate_roundtrip() {
    let (app, store) = test_app();

    let payload = json!({
        "name": "Portal Teste",
        "url": "https://portal.example/feed",
        "kind": "feed",
        "credibility": "low"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/sources")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /sources");
    let resp = app.clone().oneshot(req).await.expect("oneshot POST /sources");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = read_json(resp).await;
    let id = created["id"].as_u64().expect("created id");
    assert_eq!(created["active"], true);

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/sources").body(Body::empty()).unwrap())
        .await
        .expect("oneshot GET /sources");
    let listed = read_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/sources/{id}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.expect("oneshot DELETE /sources");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Deactivated, not removed.
    assert!(!store.get_source(id).unwrap().active);
    assert!(store.active_sources().is_empty());
}

#[tokio::test]
async fn missing_source_is_404() {
    let (app, _) = test_app();
    let resp = app
        .oneshot(Request::builder().uri("/sources/99").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_list_filters_by_status_and_rejects_bad_filter() {
    let (app, store) = test_app();
    store
        .insert_content(pending_content("https://a.example/1", ContentStatus::Pending))
        .unwrap();
    store
        .insert_content(pending_content("https://a.example/2", ContentStatus::Rejected))
        .unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/content?status=pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = read_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["status"], "pending");

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/content?status=archived")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extract_with_empty_catalog_reports_zero() {
    let (app, _) = test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/extract")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot POST /extract");
    assert_eq!(resp.status(), StatusCode::OK);
    let report = read_json(resp).await;
    assert_eq!(report["sources_run"], 0);
    assert_eq!(report["items_seen"], 0);
}

#[tokio::test]
async fn submit_single_unreachable_api_marks_failed() {
    let (app, store) = test_app();
    let c = store
        .insert_content(pending_content("https://a.example/1", ContentStatus::Pending))
        .unwrap();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/submit/{}", c.id))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot POST /submit/{id}");
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let stored = store.get_content(c.id).unwrap();
    assert_eq!(stored.status, ContentStatus::Failed);
    assert!(stored.submission_error.is_some());
}

#[tokio::test]
async fn submit_single_rejected_item_is_a_conflict() {
    let (app, store) = test_app();
    let c = store
        .insert_content(pending_content("https://a.example/1", ContentStatus::Rejected))
        .unwrap();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/submit/{}", c.id))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    // Terminal state untouched.
    assert_eq!(store.get_content(c.id).unwrap().status, ContentStatus::Rejected);
}

#[tokio::test]
async fn stats_counts_by_status() {
    let (app, store) = test_app();
    store
        .insert_content(pending_content("https://a.example/1", ContentStatus::Pending))
        .unwrap();
    store
        .insert_content(pending_content("https://a.example/2", ContentStatus::Failed))
        .unwrap();

    let resp = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let stats = read_json(resp).await;
    assert_eq!(stats["content_total"], 2);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["failed"], 1);
    assert_eq!(stats["submitted"], 0);
}
