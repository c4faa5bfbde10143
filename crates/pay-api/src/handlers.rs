//! # Request Handlers
//!
//! Axum request handlers for pricing, order intake, payment status,
//! transaction history, enrollment and gateway webhooks.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{
    is_valid_payment_id, EnrollmentDraft, EnrollmentStatus, OrderDraft, PaymentError,
    PaymentFilter, Transaction,
};
use pay_razorpay::{dispatch_webhook_event, verify_and_parse, EVENT_ID_HEADER, SIGNATURE_HEADER};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    if code >= 500 {
        error!("Request failed: {}", err);
    } else {
        info!("Request rejected: {}", err);
    }
    let response = ErrorResponse::new(err.client_message(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| bad_request(format!("Invalid JSON body: {}", rejection.body_text())))
}

/// Query of the transaction listing
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness probe
pub async fn root() -> &'static str {
    "OK"
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "pay-intake",
        "version": env!("CARGO_PKG_VERSION"),
        "gateway": state.gateway.provider_name(),
        "store": state.store.backend_name()
    }))
}

/// Current pricing with the computed final price.
///
/// A missing pricing row is reported as `200 {success:false}` for client
/// compatibility, not as an error status.
#[instrument(skip(state))]
pub async fn get_pricing(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.store.current_pricing().await {
        Ok(Some(record)) => Ok(Json(json!({
            "success": true,
            "data": record.quote()
        }))
        .into_response()),
        Ok(None) => Ok(Json(json!({
            "success": false,
            "message": PaymentError::PricingNotFound.to_string()
        }))
        .into_response()),
        Err(e) => Err(payment_error_to_response(e)),
    }
}

/// Create a gateway order (`/create_order`, `/api/create-order`, `/api/razorpay/order`)
#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?
        .validate()
        .map_err(payment_error_to_response)?;

    info!(
        "Order create request: amount={}, currency={}, receipt={}",
        request.amount, request.currency, request.receipt
    );

    let order = state
        .gateway
        .create_order(&request)
        .await
        .map_err(payment_error_to_response)?;

    Ok(Json(json!({
        "success": true,
        "order": order
    })))
}

/// Verified payment status lookup
#[instrument(skip(state))]
pub async fn check_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = payment_id.trim();
    if payment_id.is_empty() {
        return Err(bad_request("Missing payment_id in URL"));
    }
    if !is_valid_payment_id(payment_id) {
        warn!("Rejected malformed payment id: {:?}", payment_id);
        return Err(bad_request("Invalid payment_id"));
    }

    let payment = state
        .gateway
        .fetch_payment(payment_id)
        .await
        .map_err(payment_error_to_response)?;

    let status = payment.status();
    info!("Payment {} is {} ({})", payment_id, status, payment.status);

    Ok(Json(json!({
        "success": true,
        "payment_id": payment_id,
        "status": status,
        "raw_status": payment.status,
        "payment_details": payment
    })))
}

/// Payment history of a user, matched on the `email` note
#[instrument(skip(state, query))]
pub async fn user_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| bad_request("Missing email parameter"))?;

    let payments = state
        .gateway
        .list_payments(&PaymentFilter::by_email(email))
        .await
        .map_err(payment_error_to_response)?;

    let transactions: Vec<Transaction> = payments
        .iter()
        .map(|p| Transaction::from_payment(p, email))
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": transactions
    })))
}

/// Enrollment acknowledgment (`/api/enroll`, `/api/payment`).
///
/// Deprecated trust model: unless both `razorpay_order_id` and
/// `razorpay_signature` are sent, the client's word is taken as-is. When
/// both are present the checkout signature must match.
#[instrument(skip(state, payload))]
pub async fn enroll(
    State(state): State<AppState>,
    payload: Result<Json<EnrollmentDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = json_body(payload)?
        .validate()
        .map_err(payment_error_to_response)?;

    let status = match &enrollment.checkout {
        Some(proof) => {
            if !state
                .gateway
                .verify_checkout(&proof.order_id, &enrollment.payment_id, &proof.signature)
            {
                warn!("Checkout signature mismatch for payment {}", enrollment.payment_id);
                return Err(payment_error_to_response(PaymentError::SignatureMismatch));
            }
            EnrollmentStatus::Verified
        }
        None => {
            warn!(
                "Unverified enrollment acknowledged: payment={}",
                enrollment.payment_id
            );
            EnrollmentStatus::Unverified
        }
    };

    // Recording is best effort; the acknowledgment never depends on the store
    match state.store.record_payment(&enrollment.to_record(status)).await {
        Ok(id) => info!("Enrollment recorded: row={}, payment={}", id, enrollment.payment_id),
        Err(e) => error!("Failed to record enrollment {}: {}", enrollment.payment_id, e),
    }

    Ok(Json(json!({
        "success": true,
        "message": "Enrollment successful",
        "verified": status == EnrollmentStatus::Verified
    })))
}

/// Handle a Razorpay webhook
#[instrument(skip(state, headers, body))]
pub async fn razorpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let secret = state.webhook_secret.as_deref().ok_or_else(|| {
        payment_error_to_response(PaymentError::Configuration(
            "RAZORPAY_WEBHOOK_SECRET not set".to_string(),
        ))
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| bad_request("Missing X-Razorpay-Signature header"))?;

    let event_id = headers.get(EVENT_ID_HEADER).and_then(|v| v.to_str().ok());

    let event = verify_and_parse(secret, &body, signature, event_id).map_err(|e| {
        warn!("Webhook verification failed: {}", e);
        payment_error_to_response(e)
    })?;

    info!(
        "Received webhook: type={:?}, id={:?}",
        event.event_type, event.event_id
    );

    dispatch_webhook_event(state.webhook_handler.as_ref(), &event)
        .map_err(payment_error_to_response)?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert!(!err.success);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, Json(body)) = payment_error_to_response(PaymentError::missing(["amount"]));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Missing parameters: amount");
    }

    #[test]
    fn test_upstream_detail_is_not_leaked() {
        let (status, Json(body)) =
            payment_error_to_response(PaymentError::NetworkError("dns error: api.razorpay.com".into()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error, "Upstream service unavailable");
    }
}
