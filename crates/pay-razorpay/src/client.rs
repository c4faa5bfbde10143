//! # Razorpay REST Client
//!
//! Implementation of `PaymentGateway` over the Razorpay v1 REST API.
//! Order creation is attempted once; payment reads retry transient failures.

use crate::config::RazorpayConfig;
use crate::signature::verify_checkout_signature;
use async_trait::async_trait;
use pay_core::{
    is_valid_payment_id, GatewayOrder, GatewayPayment, OrderRequest, PaymentError, PaymentFilter,
    PaymentGateway, PaymentResult,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "razorpay";

/// Largest page the payments listing accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Razorpay gateway client
pub struct RazorpayClient {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayClient {
    /// Create a new client
    pub fn new(config: RazorpayConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(RazorpayConfig::from_env()?)
    }

    /// Active configuration
    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    /// `{base}/v1/{segments...}` with every segment percent-encoded
    fn url(&self, segments: &[&str]) -> PaymentResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!("Invalid Razorpay API base URL: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                PaymentError::Configuration("Razorpay API base URL cannot take a path".to_string())
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.config.key_id, Some(&self.config.key_secret))
    }

    /// Send a request and decode a successful JSON reply
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Razorpay response: {}", e))
        })
    }

    /// Run an idempotent read, retrying retryable failures
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> PaymentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PaymentResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} failed ({}), retry {}/{}",
                        operation, e, attempt, self.config.max_retries
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<GatewayOrder> {
        let body = CreateOrderBody {
            amount: request.amount,
            currency: &request.currency,
            receipt: &request.receipt,
            payment_capture: u8::from(request.payment_capture),
            notes: (!request.notes.is_empty()).then_some(&request.notes),
        };

        debug!("Creating Razorpay order: receipt={}", request.receipt);

        let order: GatewayOrder = self
            .send_json(self.client.post(self.url(&["orders"])?).json(&body))
            .await?;

        info!("Created Razorpay order: id={}, amount={}", order.id, order.amount);
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<GatewayPayment> {
        if !is_valid_payment_id(payment_id) {
            return Err(PaymentError::InvalidRequest(format!(
                "Invalid payment id: {}",
                payment_id
            )));
        }

        let url = self.url(&["payments", payment_id])?;
        self.with_retry("fetch_payment", || {
            self.send_json::<GatewayPayment>(self.client.get(url.clone()))
        })
        .await
        .map_err(|e| match e {
            PaymentError::GatewayRejected { ref message, .. } if is_unknown_id(message) => {
                PaymentError::PaymentNotFound {
                    payment_id: payment_id.to_string(),
                }
            }
            other => other,
        })
    }

    #[instrument(skip(self))]
    async fn list_payments(&self, filter: &PaymentFilter) -> PaymentResult<Vec<GatewayPayment>> {
        let count = filter.count.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let mut query: Vec<(&str, String)> = vec![("count", count.to_string())];
        if let Some(email) = &filter.email {
            query.push(("notes.email", email.clone()));
        }

        let url = self.url(&["payments"])?;
        let collection: PaymentCollection = self
            .with_retry("list_payments", || {
                self.send_json(self.client.get(url.clone()).query(&query))
            })
            .await?;

        // The listing API does not filter on notes, so the filter is applied here
        let payments: Vec<_> = collection
            .items
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();

        debug!("Listed {} matching payments", payments.len());
        Ok(payments)
    }

    fn verify_checkout(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_checkout_signature(&self.config.key_secret, order_id, payment_id, signature)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct PaymentCollection {
    #[serde(default)]
    items: Vec<GatewayPayment>,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> PaymentError {
    let description = serde_json::from_str::<RazorpayErrorResponse>(body)
        .ok()
        .and_then(|r| {
            r.error
                .description
                .or(r.error.code)
                .filter(|d| !d.is_empty())
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED => {
            PaymentError::Configuration("Razorpay rejected the API credentials".to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => PaymentError::RateLimited {
            provider: PROVIDER.to_string(),
        },
        s if s.is_client_error() => PaymentError::GatewayRejected {
            provider: PROVIDER.to_string(),
            message: description,
        },
        _ => PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message: description,
        },
    }
}

fn is_unknown_id(message: &str) -> bool {
    message.contains("does not exist") || message.contains("not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_description() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The amount must be atleast INR 1.00","field":"amount"}}"#;
        match api_error(StatusCode::BAD_REQUEST, body) {
            PaymentError::GatewayRejected { message, .. } => {
                assert_eq!(message, "The amount must be atleast INR 1.00")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_api_error_status_classes() {
        assert!(matches!(
            api_error(StatusCode::UNAUTHORIZED, ""),
            PaymentError::Configuration(_)
        ));
        assert!(matches!(
            api_error(StatusCode::TOO_MANY_REQUESTS, ""),
            PaymentError::RateLimited { .. }
        ));
        match api_error(StatusCode::BAD_GATEWAY, "<html>") {
            PaymentError::ProviderError { message, .. } => assert_eq!(message, "HTTP 502"),
            other => panic!("unexpected {other:?}"),
        }
    }

    fn client_for(base: &str) -> RazorpayClient {
        RazorpayClient::new(
            RazorpayConfig::new("rzp_test_key", "secret").with_api_base_url(base),
        )
        .unwrap()
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = client_for("https://api.razorpay.com");
        assert_eq!(
            client.url(&["payments", "pay_29QQoUBi66xm2f"]).unwrap().as_str(),
            "https://api.razorpay.com/v1/payments/pay_29QQoUBi66xm2f"
        );
        assert_eq!(
            client.url(&["payments", "a/../orders"]).unwrap().as_str(),
            "https://api.razorpay.com/v1/payments/a%2F..%2Forders"
        );

        let client = client_for("http://127.0.0.1:9000/");
        assert_eq!(
            client.url(&["orders"]).unwrap().as_str(),
            "http://127.0.0.1:9000/v1/orders"
        );
    }

    #[tokio::test]
    async fn test_fetch_payment_refuses_malformed_id() {
        // Unroutable base; a request attempt would surface as a network error
        let client = client_for("http://127.0.0.1:1");
        let err = client.fetch_payment("../orders/order_1").await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_create_order_body_shape() {
        let request = OrderRequest::new(19900, "INR").with_receipt("receipt_1");
        let body = CreateOrderBody {
            amount: request.amount,
            currency: &request.currency,
            receipt: &request.receipt,
            payment_capture: 1,
            notes: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "amount": 19900,
                "currency": "INR",
                "receipt": "receipt_1",
                "payment_capture": 1
            })
        );
    }
}
