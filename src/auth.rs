// src/auth.rs
//! OAuth2 client-credentials token lifecycle. One cached token per process,
//! refreshed single-flight: the mutex is held across the exchange so
//! concurrent submitters wait on one network round-trip instead of racing
//! their own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tokens within this margin of expiry are treated as expired.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token exchange request failed: {0}")]
    Exchange(String),
    #[error("token endpoint returned status {0}")]
    Denied(u16),
}

/// One credential exchange round-trip. A trait seam so tests can count calls.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self) -> Result<IssuedToken, AuthError>;
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.checked_duration_since(now).is_some_and(|left| left > EXPIRY_MARGIN)
    }
}

/// Process-wide token cache. Owned explicitly and passed by reference to the
/// submission service; nothing here is ambient state.
pub struct TokenManager<E> {
    exchange: E,
    cached: Mutex<Option<CachedToken>>,
}

impl<E: TokenExchange> TokenManager<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            cached: Mutex::new(None),
        }
    }

    /// Return a token with more than `EXPIRY_MARGIN` of validity left,
    /// refreshing if needed. Callers arriving during a refresh block on the
    /// lock and reuse its result.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let now = Instant::now();
        let mut guard = self.cached.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(now) {
                debug!("using cached access token");
                return Ok(cached.token.clone());
            }
        }

        match self.exchange.exchange().await {
            Ok(issued) => {
                info!(expires_in = issued.expires_in.as_secs(), "acquired access token");
                let cached = CachedToken {
                    token: issued.access_token.clone(),
                    expires_at: now + issued.expires_in,
                };
                *guard = Some(cached);
                Ok(issued.access_token)
            }
            Err(e) => {
                // A failed refresh must not corrupt a still-valid token.
                if let Some(stale) = guard.as_ref() {
                    if stale.expires_at > Instant::now() {
                        warn!(error = %e, "token refresh failed, serving stale token");
                        return Ok(stale.token.clone());
                    }
                }
                *guard = None;
                Err(e)
            }
        }
    }

    /// Drop the cache so the next `get_token` performs a fresh exchange.
    /// Used after the remote API rejects a token we thought was valid.
    pub async fn force_refresh(&self) {
        let mut guard = self.cached.lock().await;
        *guard = None;
    }
}

/// Real exchange against an Ory-style OAuth2 token endpoint,
/// client_secret_basic.
pub struct OryExchange {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

impl OryExchange {
    pub fn new(base_url: &str, client_id: &str, client_secret: &str, scope: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(EXCHANGE_TIMEOUT)
                .build()
                .unwrap_or_default(),
            token_url: format!("{}/oauth2/token", base_url.trim_end_matches('/')),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope: scope.to_string(),
        }
    }
}

#[async_trait]
impl TokenExchange for OryExchange {
    async fn exchange(&self) -> Result<IssuedToken, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AuthError::Denied(resp.status().as_u16()));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("decoding token response: {e}")))?;

        Ok(IssuedToken {
            access_token: body.access_token,
            expires_in: Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)),
        })
    }
}
