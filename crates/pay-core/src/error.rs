//! # Payment Error Types
//!
//! Typed error handling for the pricing and order-intake service.
//! All gateway, store and validation operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment and pricing operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more required request fields were absent
    #[error("Missing parameters: {}", fields.join(", "))]
    MissingParameters { fields: Vec<String> },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amount is not a positive integer in the accepted range
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Currency code is malformed
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// No pricing row exists in the store
    #[error("No pricing set")]
    PricingNotFound,

    /// Gateway does not know the payment
    #[error("Payment not found: {payment_id}")]
    PaymentNotFound { payment_id: String },

    /// Gateway refused the request (4xx)
    #[error("Rejected by {provider}: {message}")]
    GatewayRejected { provider: String, message: String },

    /// Payment provider API error (5xx or unparseable reply)
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with an upstream service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Relational store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Checkout signature did not match `order_id|payment_id`
    #[error("Payment signature mismatch")]
    SignatureMismatch,

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Rate limited by provider
    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Build a `MissingParameters` error from field names
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PaymentError::MissingParameters {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_)
                | PaymentError::RateLimited { .. }
                | PaymentError::ProviderError { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::MissingParameters { .. } => 400,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidAmount { .. } => 400,
            PaymentError::UnsupportedCurrency { .. } => 400,
            PaymentError::PricingNotFound => 404,
            PaymentError::PaymentNotFound { .. } => 404,
            PaymentError::GatewayRejected { .. } => 400,
            PaymentError::ProviderError { .. } => 500,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Store(_) => 500,
            PaymentError::SignatureMismatch => 400,
            PaymentError::WebhookVerificationFailed(_) => 401,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::RateLimited { .. } => 429,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }

    /// Message safe to return to API callers.
    ///
    /// Validation errors and gateway descriptions pass through; transport,
    /// store and internal failures are reduced to a generic message so
    /// hostnames, SQL and stack details stay in the log.
    pub fn client_message(&self) -> String {
        match self {
            PaymentError::Configuration(_) => "Service is not configured".to_string(),
            PaymentError::NetworkError(_) => "Upstream service unavailable".to_string(),
            PaymentError::Store(_) => "Pricing store unavailable".to_string(),
            PaymentError::Internal(_) | PaymentError::Serialization(_) => {
                "Internal server error".to_string()
            }
            PaymentError::GatewayRejected { message, .. }
            | PaymentError::ProviderError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
