//! # Razorpay Webhook Handling
//!
//! Verification, parsing and dispatch of Razorpay webhooks.
//! Razorpay signs the raw body with the webhook secret and sends the hex
//! digest in `X-Razorpay-Signature`.

use crate::signature::verify_webhook_signature;
use chrono::{DateTime, Utc};
use pay_core::{PaymentError, PaymentResult, WebhookEvent, WebhookEventType};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Header carrying the event id (used for de-duplication downstream)
pub const EVENT_ID_HEADER: &str = "x-razorpay-event-id";

/// Verify the signature of a webhook body and parse it
pub fn verify_and_parse(
    webhook_secret: &str,
    body: &[u8],
    signature: &str,
    event_id: Option<&str>,
) -> PaymentResult<WebhookEvent> {
    if !verify_webhook_signature(webhook_secret, body, signature) {
        return Err(PaymentError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }
    parse_webhook_event(body, event_id)
}

/// Parse a (verified) webhook body
pub fn parse_webhook_event(body: &[u8], event_id: Option<&str>) -> PaymentResult<WebhookEvent> {
    let envelope: RazorpayWebhook = serde_json::from_slice(body).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Parsed Razorpay webhook: event={}", envelope.event);

    let event_type = match envelope.event.as_str() {
        "payment.authorized" => WebhookEventType::PaymentAuthorized,
        "payment.captured" => WebhookEventType::PaymentCaptured,
        "payment.failed" => WebhookEventType::PaymentFailed,
        "order.paid" => WebhookEventType::OrderPaid,
        "refund.processed" => WebhookEventType::RefundProcessed,
        other => WebhookEventType::Unknown(other.to_string()),
    };

    let payment = entity(&envelope.payload, "payment");
    let order = entity(&envelope.payload, "order");
    let refund = entity(&envelope.payload, "refund");

    let payment_id = str_field(payment, "id")
        .or_else(|| str_field(refund, "payment_id"))
        .map(String::from);

    let order_id = str_field(payment, "order_id")
        .or_else(|| str_field(order, "id"))
        .map(String::from);

    let customer_email = str_field(payment, "email")
        .or_else(|| str_field(payment.and_then(|p| p.get("notes")), "email"))
        .map(String::from);

    let amount = refund
        .or(payment)
        .or(order)
        .and_then(|e| e.get("amount"))
        .and_then(Value::as_u64);

    Ok(WebhookEvent {
        event_id: event_id.map(String::from),
        event_type,
        provider: "razorpay".to_string(),
        payment_id,
        order_id,
        customer_email,
        amount,
        raw_data: Some(envelope.payload),
        timestamp: envelope
            .created_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now),
    })
}

fn entity<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload.get(name).and_then(|p| p.get("entity"))
}

fn str_field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value.and_then(|v| v.get(key)).and_then(Value::as_str)
}

#[derive(Debug, Deserialize)]
struct RazorpayWebhook {
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    created_at: Option<i64>,
}

/// Webhook event handler trait
///
/// Implement this trait to react to gateway events.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment is captured
    fn on_payment_captured(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment captured: payment={:?}, amount={:?}",
            event.payment_id, event.amount
        );
        Ok(())
    }

    /// Called when a payment is authorized but not captured
    fn on_payment_authorized(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Payment authorized: {:?}", event.payment_id);
        Ok(())
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!("Payment failed: {:?}", event.payment_id);
        Ok(())
    }

    /// Called when an order is fully paid
    fn on_order_paid(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Order paid: {:?}", event.order_id);
        Ok(())
    }

    /// Called when a refund is processed
    fn on_refund_processed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Refund processed: {:?}", event.payment_id);
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {:?}", event.event_type);
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &WebhookEvent) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentCaptured => handler.on_payment_captured(event),
        WebhookEventType::PaymentAuthorized => handler.on_payment_authorized(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::OrderPaid => handler.on_order_paid(event),
        WebhookEventType::RefundProcessed => handler.on_refund_processed(event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(event),
    }
}

/// Events to enable in the Razorpay dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "payment.authorized",
    "payment.captured",
    "payment.failed",
    "order.paid",
    "refund.processed",
];
