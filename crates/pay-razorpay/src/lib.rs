//! # pay-razorpay
//!
//! Razorpay gateway for the pricing and order-intake service.
//!
//! - **RazorpayClient** implements `PaymentGateway` over the v1 REST API
//!   (orders, payment fetch, payment listing) with basic auth, per-request
//!   timeouts and bounded retries on reads.
//! - **signature** checks checkout-widget and webhook HMAC signatures.
//! - **webhook** parses verified webhook bodies and dispatches them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_razorpay::RazorpayClient;
//! use pay_core::{OrderRequest, PaymentGateway};
//!
//! let gateway = RazorpayClient::from_env()?;
//! let order = gateway.create_order(&OrderRequest::new(19900, "INR")).await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_razorpay::webhook::{verify_and_parse, dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = verify_and_parse(&secret, &body, signature, event_id)?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod client;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use client::RazorpayClient;
pub use config::RazorpayConfig;
pub use signature::{compute_hmac_sha256, verify_checkout_signature, verify_webhook_signature};
pub use webhook::{
    dispatch_webhook_event, parse_webhook_event, verify_and_parse, LoggingWebhookHandler,
    WebhookHandler, EVENT_ID_HEADER, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
