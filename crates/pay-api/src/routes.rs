//! # Routes
//!
//! Axum router configuration for the pricing and order-intake API.
//! Order creation and enrollment keep their historical path aliases.

use crate::handlers;
use crate::state::{AppConfig, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - GET  / - Liveness probe
/// - GET  /health - Health check
/// - GET  /api/pricing - Current pricing
/// - POST /create_order, /api/create-order, /api/razorpay/order - Create order
/// - GET  /check_payment_status/{payment_id} - Verified payment status
/// - GET  /api/user_transactions?email= - Payment history
/// - POST /api/enroll, /api/payment - Enrollment acknowledgment
/// - POST /webhook/razorpay - Razorpay webhook handler
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        .route("/pricing", get(handlers::get_pricing))
        .route("/create-order", post(handlers::create_order))
        .route("/razorpay/order", post(handlers::create_order))
        .route("/user_transactions", get(handlers::user_transactions))
        .route("/enroll", post(handlers::enroll))
        .route("/payment", post(handlers::enroll));

    // Webhook routes (must accept raw body)
    let webhook_routes = Router::new().route("/razorpay", post(handlers::razorpay_webhook));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/create_order", post(handlers::create_order))
        .route(
            "/check_payment_status/{payment_id}",
            get(handlers::check_payment_status),
        )
        .nest("/api", api_routes)
        .nest("/webhook", webhook_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when no allow-list is configured, otherwise the listed
/// origins with credentials.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
