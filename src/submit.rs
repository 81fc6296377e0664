// src/submit.rs
//! Submission service: maps admitted content to the external verification
//! schema, classifies its impact area, and drives the pending/failed batch
//! through the verification API behind the token manager.

use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthError, TokenExchange, TokenManager};
use crate::config::Settings;
use crate::model::{Content, ContentStatus};
use crate::store::Store;

pub const RECEPTION_CHANNEL: &str = "automated_monitoring";
pub const REPORT_TYPE: &str = "Unattributed";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    /// The remote rejected the bearer token; refresh once and retry.
    #[error("access token rejected by the verification api")]
    Unauthorized,
    /// Timeout, connect failure, or 5xx: worth retrying later.
    #[error("retryable submission failure: {0}")]
    Retryable(String),
    /// 4xx validation rejection; retrying without changing the data would
    /// repeat the same answer.
    #[error("submission rejected: {0}")]
    Rejected(String),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SubmitError::Rejected(_))
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            SubmitError::Unauthorized
        } else if status.is_server_error() {
            SubmitError::Retryable(format!("status {status}: {body}"))
        } else {
            SubmitError::Rejected(format!("status {status}: {body}"))
        }
    }
}

/// Coarse topical category, first match in order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactArea {
    Politics,
    Health,
    Science,
    General,
}

impl ImpactArea {
    pub fn label(self) -> &'static str {
        match self {
            ImpactArea::Politics => "Politics",
            ImpactArea::Health => "Health",
            ImpactArea::Science => "Science",
            ImpactArea::General => "General",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            ImpactArea::Politics => "politics",
            ImpactArea::Health => "health",
            ImpactArea::Science => "science",
            ImpactArea::General => "general",
        }
    }
}

const POLITICS_KW: &[&str] = &["governo", "presidente", "ministro", "eleição", "congresso", "senado"];
const HEALTH_KW: &[&str] = &["vacina", "covid", "saúde", "hospital", "médico", "doença"];
const SCIENCE_KW: &[&str] = &["cientista", "pesquisa", "estudo", "universidade", "descoberta"];

pub fn classify_impact_area(text: &str) -> ImpactArea {
    let lower = text.to_lowercase();
    let hit = |kws: &[&str]| kws.iter().any(|kw| lower.contains(kw));
    if hit(POLITICS_KW) {
        ImpactArea::Politics
    } else if hit(HEALTH_KW) {
        ImpactArea::Health
    } else if hit(SCIENCE_KW) {
        ImpactArea::Science
    } else {
        ImpactArea::General
    }
}

#[derive(Debug, Serialize)]
pub struct ImpactAreaField {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SourceRef {
    pub href: String,
}

/// Wire schema of the external verification-request endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub content: String,
    pub reception_channel: &'static str,
    pub report_type: &'static str,
    pub impact_area: ImpactAreaField,
    pub source: Vec<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<DateTime<Utc>>,
    pub date: DateTime<Utc>,
    pub heard_from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha: Option<String>,
}

impl VerificationRequest {
    pub fn from_content(content: &Content, recaptcha: Option<&str>) -> Self {
        let area = classify_impact_area(&content.body);
        Self {
            content: content.body.clone(),
            reception_channel: RECEPTION_CHANNEL,
            report_type: REPORT_TYPE,
            impact_area: ImpactAreaField {
                label: area.label(),
                value: area.value(),
            },
            source: vec![SourceRef {
                href: content.url.clone(),
            }],
            publication_date: content.published_at,
            date: content.extracted_at,
            heard_from: format!("Automated Monitoring - {}", content.source_name),
            recaptcha: recaptcha.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerificationResponse {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "id")]
    alt_id: Option<String>,
}

/// Outcome summary of one batch run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SubmissionReport {
    pub selected: usize,
    pub submitted: usize,
    pub failed: usize,
}

pub struct SubmissionService<E> {
    client: Client,
    base_url: String,
    tokens: TokenManager<E>,
    recaptcha: Option<String>,
}

impl<E: TokenExchange> SubmissionService<E> {
    pub fn new(settings: &Settings, tokens: TokenManager<E>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: settings.verify_base_url.trim_end_matches('/').to_string(),
            tokens,
            recaptcha: settings.recaptcha_token.clone(),
        }
    }

    /// Submit one content record. On 401 the cached token is dropped and the
    /// call retried once with a fresh one before giving up.
    pub async fn submit_one(&self, content: &Content) -> Result<String, SubmitError> {
        match self.call_api(content).await {
            Err(SubmitError::Unauthorized) => {
                warn!(content_id = content.id, "token rejected by remote, refreshing once");
                self.tokens.force_refresh().await;
                self.call_api(content).await
            }
            other => other,
        }
    }

    async fn call_api(&self, content: &Content) -> Result<String, SubmitError> {
        let token = self.tokens.get_token().await?;
        let payload = VerificationRequest::from_content(content, self.recaptcha.as_deref());

        let resp = self
            .client
            .post(format!("{}/api/verification-request", self.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SubmitError::Retryable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmitError::from_status(status, &body));
        }

        let body: VerificationResponse = resp
            .json()
            .await
            .map_err(|e| SubmitError::Retryable(format!("decoding response: {e}")))?;
        body.id
            .or(body.alt_id)
            .ok_or_else(|| SubmitError::Rejected("response carried no request id".to_string()))
    }

    /// Run a bounded submission batch over `pending` (and optionally
    /// `failed`) items. Each item's outcome is recorded independently; one
    /// failure never aborts the rest.
    pub async fn submit_batch(
        &self,
        store: &Store,
        settings: &Settings,
        include_failed: bool,
    ) -> SubmissionReport {
        let mut batch = store.list_by_status(ContentStatus::Pending, settings.max_batch_submission);
        if include_failed {
            let remaining = settings.max_batch_submission.saturating_sub(batch.len());
            batch.extend(store.list_by_status(ContentStatus::Failed, remaining));
        }

        let mut report = SubmissionReport {
            selected: batch.len(),
            ..Default::default()
        };

        for content in batch {
            // The threshold is operator-tunable; items scored under an older,
            // lower threshold are re-rejected instead of submitted.
            if content.status == ContentStatus::Pending
                && content.score < settings.submission_score_threshold
            {
                let _ = store.reject_below_threshold(content.id, "score below submission threshold");
                continue;
            }

            match self.submit_one(&content).await {
                Ok(vr_id) => {
                    if let Err(e) = store.set_submitted(content.id, &vr_id) {
                        warn!(content_id = content.id, error = %e, "could not record submission");
                        continue;
                    }
                    let _ = store.record_submitted(content.source_id);
                    counter!("submission_success_total").increment(1);
                    info!(content_id = content.id, vr_id = %vr_id, "submitted verification request");
                    report.submitted += 1;
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    if let Err(se) = store.set_failed(content.id, &e.to_string()) {
                        warn!(content_id = content.id, error = %se, "could not record failure");
                    }
                    counter!("submission_failed_total").increment(1);
                    warn!(
                        content_id = content.id,
                        retryable,
                        error = %e,
                        "submission failed"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            selected = report.selected,
            submitted = report.submitted,
            failed = report.failed,
            "submission batch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CredibilityLevel;

    #[test]
    fn impact_area_order_is_politics_first() {
        // Political and health keywords together: politics wins by order.
        assert_eq!(
            classify_impact_area("governo amplia campanha de vacina"),
            ImpactArea::Politics
        );
        assert_eq!(classify_impact_area("nova vacina aprovada"), ImpactArea::Health);
        assert_eq!(
            classify_impact_area("pesquisa da universidade"),
            ImpactArea::Science
        );
        assert_eq!(classify_impact_area("previsão do tempo"), ImpactArea::General);
    }

    #[test]
    fn retryable_classification() {
        assert!(SubmitError::from_status(StatusCode::UNAUTHORIZED, "").is_retryable());
        assert!(SubmitError::from_status(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(!SubmitError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "").is_retryable());
        assert!(!SubmitError::from_status(StatusCode::BAD_REQUEST, "").is_retryable());
        assert!(SubmitError::Auth(AuthError::Denied(500)).is_retryable());
    }

    #[test]
    fn only_a_401_status_classifies_as_unauthorized() {
        // A gateway error whose body happens to mention 401 must stay a plain
        // retryable failure; the token-refresh path keys on the status alone.
        let e = SubmitError::from_status(StatusCode::BAD_GATEWAY, "upstream auth said 401");
        assert!(matches!(e, SubmitError::Retryable(_)));

        let e = SubmitError::from_status(StatusCode::UNAUTHORIZED, "expired");
        assert!(matches!(e, SubmitError::Unauthorized));
    }

    #[test]
    fn payload_matches_wire_schema() {
        let content = Content {
            id: 7,
            source_id: 1,
            source_name: "Blog X".into(),
            credibility: CredibilityLevel::Low,
            title: "t".into(),
            body: "o governo confirmou 23%".into(),
            url: "https://blog.example/a".into(),
            normalized_url: "https://blog.example/a".into(),
            content_hash: "h".into(),
            published_at: None,
            extracted_at: Utc::now(),
            score: 40,
            status: ContentStatus::Pending,
            verification_request_id: None,
            submission_error: None,
            submitted_at: None,
        };
        let req = VerificationRequest::from_content(&content, Some("tok"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["receptionChannel"], RECEPTION_CHANNEL);
        assert_eq!(json["reportType"], REPORT_TYPE);
        assert_eq!(json["impactArea"]["value"], "politics");
        assert_eq!(json["source"][0]["href"], "https://blog.example/a");
        assert_eq!(json["heardFrom"], "Automated Monitoring - Blog X");
        assert_eq!(json["recaptcha"], "tok");
        // Absent optional fields are omitted, not null.
        assert!(json.get("publicationDate").is_none());
    }
}
