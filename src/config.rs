// src/config.rs
//! Runtime settings from environment variables (after `dotenvy` has run).
//! Bad values warn and fall back to defaults rather than aborting startup.

use tracing::warn;

pub const ENV_EXTRACTION_INTERVAL: &str = "EXTRACTION_INTERVAL_MINUTES";
pub const ENV_MINIMUM_SAVE_SCORE: &str = "MINIMUM_SAVE_SCORE";
pub const ENV_SUBMISSION_THRESHOLD: &str = "SUBMISSION_SCORE_THRESHOLD";
pub const ENV_AUTO_SUBMIT: &str = "AUTO_SUBMIT_ENABLED";
pub const ENV_MAX_BATCH_SUBMISSION: &str = "MAX_BATCH_SUBMISSION";
pub const ENV_MAX_CONCURRENT_EXTRACTIONS: &str = "MAX_CONCURRENT_EXTRACTIONS";

#[derive(Debug, Clone)]
pub struct Settings {
    pub extraction_interval_minutes: u64,
    /// Below this the item is dropped outright, never persisted.
    pub minimum_save_score: u8,
    /// At or above this a saved item enters `pending`, else `rejected`.
    pub submission_score_threshold: u8,
    pub auto_submit_enabled: bool,
    pub max_batch_submission: usize,
    pub max_concurrent_extractions: usize,

    // OAuth2 client-credentials exchange
    pub oauth_token_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_scope: String,

    // External verification API
    pub verify_base_url: String,
    pub recaptcha_token: Option<String>,

    pub bind_addr: String,
    pub sources_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extraction_interval_minutes: 30,
            minimum_save_score: 20,
            submission_score_threshold: 35,
            auto_submit_enabled: false,
            max_batch_submission: 100,
            max_concurrent_extractions: 4,
            oauth_token_url: "http://localhost:4444".to_string(),
            oauth_client_id: String::new(),
            oauth_client_secret: String::new(),
            oauth_scope: "openid offline_access".to_string(),
            verify_base_url: "http://localhost:3000".to_string(),
            recaptcha_token: None,
            bind_addr: "0.0.0.0:8000".to_string(),
            sources_path: "config/sources.toml".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            extraction_interval_minutes: parse_env(
                ENV_EXTRACTION_INTERVAL,
                d.extraction_interval_minutes,
            ),
            minimum_save_score: parse_env(ENV_MINIMUM_SAVE_SCORE, d.minimum_save_score),
            submission_score_threshold: parse_env(
                ENV_SUBMISSION_THRESHOLD,
                d.submission_score_threshold,
            ),
            auto_submit_enabled: parse_bool_env(ENV_AUTO_SUBMIT, d.auto_submit_enabled),
            max_batch_submission: parse_env(ENV_MAX_BATCH_SUBMISSION, d.max_batch_submission),
            max_concurrent_extractions: parse_env(
                ENV_MAX_CONCURRENT_EXTRACTIONS,
                d.max_concurrent_extractions,
            ),
            oauth_token_url: string_env("OAUTH_TOKEN_URL", d.oauth_token_url),
            oauth_client_id: string_env("OAUTH_CLIENT_ID", d.oauth_client_id),
            oauth_client_secret: string_env("OAUTH_CLIENT_SECRET", d.oauth_client_secret),
            oauth_scope: string_env("OAUTH_SCOPE", d.oauth_scope),
            verify_base_url: string_env("VERIFY_BASE_URL", d.verify_base_url),
            recaptcha_token: std::env::var("RECAPTCHA_TOKEN").ok().filter(|s| !s.is_empty()),
            bind_addr: string_env("BIND_ADDR", d.bind_addr),
            sources_path: string_env("SOURCES_PATH", d.sources_path),
        }
    }
}

fn string_env(name: &str, default: String) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(env = name, value = %raw, "unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_bool_env(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn defaults_apply_without_env() {
        std::env::remove_var(ENV_SUBMISSION_THRESHOLD);
        std::env::remove_var(ENV_MINIMUM_SAVE_SCORE);
        let s = Settings::from_env();
        assert_eq!(s.submission_score_threshold, 35);
        assert_eq!(s.minimum_save_score, 20);
        assert!(!s.auto_submit_enabled);
    }

    #[serial_test::serial]
    #[test]
    fn garbage_numeric_env_falls_back() {
        std::env::set_var(ENV_SUBMISSION_THRESHOLD, "not-a-number");
        let s = Settings::from_env();
        assert_eq!(s.submission_score_threshold, 35);
        std::env::remove_var(ENV_SUBMISSION_THRESHOLD);
    }

    #[serial_test::serial]
    #[test]
    fn bool_env_accepts_common_spellings() {
        for v in ["1", "true", "YES"] {
            std::env::set_var(ENV_AUTO_SUBMIT, v);
            assert!(Settings::from_env().auto_submit_enabled, "value {v}");
        }
        std::env::set_var(ENV_AUTO_SUBMIT, "0");
        assert!(!Settings::from_env().auto_submit_enabled);
        std::env::remove_var(ENV_AUTO_SUBMIT);
    }
}
