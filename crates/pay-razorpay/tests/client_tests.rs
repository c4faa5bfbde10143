//! Razorpay client tests against a mock HTTP server.

use pay_core::{OrderRequest, PaymentError, PaymentFilter, PaymentGateway};
use pay_razorpay::{compute_hmac_sha256, RazorpayClient, RazorpayConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ID: &str = "rzp_test_1DP5mmOlF5G5ag";
const KEY_SECRET: &str = "thisisasecret";

fn client_for(server: &MockServer) -> RazorpayClient {
    let config = RazorpayConfig::new(KEY_ID, KEY_SECRET)
        .with_api_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
        .with_retries(2, Duration::from_millis(1));
    RazorpayClient::new(config).unwrap()
}

fn payment_json(id: &str, status: &str, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "entity": "payment",
        "amount": 19900,
        "currency": "INR",
        "status": status,
        "order_id": "order_EKwxwAgItmmXdp",
        "method": "upi",
        "captured": status == "captured",
        "notes": {"email": email},
        "created_at": 1582628071
    })
}

#[tokio::test]
async fn create_order_sends_capture_flag_and_returns_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(basic_auth(KEY_ID, KEY_SECRET))
        .and(body_json(json!({
            "amount": 19900,
            "currency": "INR",
            "receipt": "receipt_42",
            "payment_capture": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_IluGWxBm9U8zJ8",
            "entity": "order",
            "amount": 19900,
            "amount_paid": 0,
            "amount_due": 19900,
            "currency": "INR",
            "receipt": "receipt_42",
            "offer_id": null,
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1642662092
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let order = gateway
        .create_order(&OrderRequest::new(19900, "INR").with_receipt("receipt_42"))
        .await
        .unwrap();

    assert_eq!(order.id, "order_IluGWxBm9U8zJ8");
    assert_eq!(order.amount, 19900);
    assert_eq!(order.status, "created");
}

#[tokio::test]
async fn create_order_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let err = gateway
        .create_order(&OrderRequest::new(19900, "INR"))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::ProviderError { .. }));
}

#[tokio::test]
async fn create_order_surfaces_gateway_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "Currency is not supported",
                "field": "currency"
            }
        })))
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let err = gateway
        .create_order(&OrderRequest::new(19900, "XYZ"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.client_message(), "Currency is not supported");
}

#[tokio::test]
async fn fetch_payment_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_29QQoUBi66xm2f"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_29QQoUBi66xm2f"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_json(
                "pay_29QQoUBi66xm2f",
                "captured",
                "asha@example.in",
            )),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let payment = gateway.fetch_payment("pay_29QQoUBi66xm2f").await.unwrap();

    assert_eq!(payment.status, "captured");
    assert_eq!(payment.order_id.as_deref(), Some("order_EKwxwAgItmmXdp"));
}

#[tokio::test]
async fn fetch_payment_gives_up_after_retry_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let err = gateway.fetch_payment("pay_down").await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn fetch_unknown_payment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_missing"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BAD_REQUEST_ERROR", "description": "The id provided does not exist"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let err = gateway.fetch_payment("pay_missing").await.unwrap_err();
    assert!(matches!(err, PaymentError::PaymentNotFound { .. }));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn fetch_payment_never_leaves_the_payments_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/orders/order_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_secret", "entity": "order", "amount": 500000, "status": "paid"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    for id in ["../orders/order_secret", "pay_1/../../orders/order_secret", "..", "order_secret"] {
        let err = gateway.fetch_payment(id).await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)), "{id}");
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn list_payments_filters_on_email_note() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments"))
        .and(query_param("notes.email", "asha@example.in"))
        .and(query_param("count", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity": "collection",
            "count": 3,
            "items": [
                payment_json("pay_1", "captured", "asha@example.in"),
                payment_json("pay_2", "failed", "someone@else.in"),
                payment_json("pay_3", "refunded", "asha@example.in")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let payments = gateway
        .list_payments(&PaymentFilter::by_email("asha@example.in"))
        .await
        .unwrap();

    let ids: Vec<_> = payments.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["pay_1", "pay_3"]);
}

#[tokio::test]
async fn bad_credentials_are_a_configuration_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "BAD_REQUEST_ERROR", "description": "Authentication failed"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = client_for(&server);
    let err = gateway
        .list_payments(&PaymentFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Configuration(_)));
}

#[test]
fn checkout_signature_uses_key_secret() {
    let config = RazorpayConfig::new(KEY_ID, KEY_SECRET);
    let gateway = RazorpayClient::new(config).unwrap();
    let signature = compute_hmac_sha256(KEY_SECRET, b"order_1|pay_1");

    assert!(gateway.verify_checkout("order_1", "pay_1", &signature));
    assert!(!gateway.verify_checkout("order_1", "pay_1", "0000"));
}
