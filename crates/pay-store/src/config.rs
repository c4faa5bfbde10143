//! # Store Configuration
//!
//! Connection settings for the hosted libSQL database.

use pay_core::PaymentError;
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Turso / libSQL connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database URL as issued (`libsql://...`, `https://...` or `http://...`)
    pub url: String,

    /// Bearer token, absent for unauthenticated local servers
    pub auth_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl StoreConfig {
    /// Load from `TURSO_DATABASE_URL`, `TURSO_AUTH_TOKEN` and `STORE_TIMEOUT_SECS`.
    ///
    /// Returns `Ok(None)` when no database URL is configured.
    pub fn from_env() -> Result<Option<Self>, PaymentError> {
        dotenvy::dotenv().ok();

        let url = match env::var("TURSO_DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => return Ok(None),
        };

        let mut config = Self::new(url);
        config.auth_token = env::var("TURSO_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        if let Some(secs) = env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        config.pipeline_url()?;
        Ok(Some(config))
    }

    /// Create config with explicit values
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set auth token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// HTTP endpoint of the pipeline API.
    ///
    /// `libsql://` and `wss://` URLs are served over HTTPS, `ws://` over HTTP.
    pub fn pipeline_url(&self) -> Result<String, PaymentError> {
        let url = self.url.trim_end_matches('/');
        let base = if let Some(host) = url.strip_prefix("libsql://") {
            format!("https://{}", host)
        } else if let Some(host) = url.strip_prefix("wss://") {
            format!("https://{}", host)
        } else if let Some(host) = url.strip_prefix("ws://") {
            format!("http://{}", host)
        } else if url.starts_with("https://") || url.starts_with("http://") {
            url.to_string()
        } else {
            return Err(PaymentError::Configuration(format!(
                "TURSO_DATABASE_URL has an unsupported scheme: {}",
                url
            )));
        };
        Ok(format!("{}/v2/pipeline", base))
    }
}
