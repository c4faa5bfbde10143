//! # Webhook Events
//!
//! Provider-neutral form of a verified gateway webhook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Payment authorized, not yet captured
    PaymentAuthorized,
    /// Payment captured
    PaymentCaptured,
    /// Payment failed
    PaymentFailed,
    /// Order fully paid
    OrderPaid,
    /// Refund processed
    RefundProcessed,
    /// Unknown event (passthrough)
    Unknown(String),
}

/// A parsed webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event id (from the `x-razorpay-event-id` header when present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event type
    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Related payment id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Related order id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Customer email (payment field, falling back to the `email` note)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Amount in minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,

    /// Raw payload (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}
