//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the gateway and store as injected trait objects plus configuration.

use pay_core::{BoxedPaymentGateway, BoxedPricingStore};
use pay_razorpay::{LoggingWebhookHandler, RazorpayClient, WebhookHandler};
use pay_store::{MemoryStore, StoreConfig, TursoStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Origins allowed by CORS; empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| is_json_format(&v))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            cors_allowed_origins: Vec::new(),
            json_logs: false,
        }
    }
}

fn is_json_format(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("json")
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Pricing / enrollment store
    pub store: BoxedPricingStore,
    /// Secret for `X-Razorpay-Signature`; webhooks are refused without it
    pub webhook_secret: Option<String>,
    /// Receiver of verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from explicitly constructed collaborators
    pub fn new(config: AppConfig, gateway: BoxedPaymentGateway, store: BoxedPricingStore) -> Self {
        Self {
            gateway,
            store,
            webhook_secret: None,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            config,
        }
    }

    /// Builder: set the webhook secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    /// Build state from the environment: Razorpay gateway plus Turso store,
    /// or an in-memory store when no database URL is set.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env())
    }

    /// Build the gateway and store from the environment around an already
    /// loaded `AppConfig`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let gateway = RazorpayClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Razorpay: {}", e))?;
        let webhook_secret = gateway.config().webhook_secret.clone();
        if gateway.config().is_live_mode() {
            info!("Razorpay live mode");
        }

        let store: BoxedPricingStore = match StoreConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Invalid store config: {}", e))?
        {
            Some(store_config) => Arc::new(
                TursoStore::new(store_config)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize store: {}", e))?,
            ),
            None => {
                warn!("TURSO_DATABASE_URL not set, using in-memory pricing");
                Arc::new(MemoryStore::new())
            }
        };

        let mut state = Self::new(config, Arc::new(gateway), store);
        state.webhook_secret = webhook_secret;
        if state.webhook_secret.is_none() {
            warn!("RAZORPAY_WEBHOOK_SECRET not set, webhooks will be refused");
        }
        Ok(state)
    }
}
