//! # Payment Gateway Trait
//!
//! Seam between the HTTP handlers and the payment processor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentGateway (trait)                     │
//! │  ├── create_order()      at most one attempt                │
//! │  ├── fetch_payment()     idempotent read                    │
//! │  ├── list_payments()     idempotent read                    │
//! │  └── verify_checkout()   signature of order_id|payment_id   │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴────────┐                 ┌────────┴───────┐
//!  │ RazorpayClient │                 │  test fakes    │
//!  └────────────────┘                 └────────────────┘
//! ```

use crate::error::PaymentResult;
use crate::order::{GatewayOrder, OrderRequest};
use crate::payment::{GatewayPayment, PaymentFilter};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the service needs from a payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for the given amount in minor units.
    async fn create_order(&self, request: &OrderRequest) -> PaymentResult<GatewayOrder>;

    /// Fetch a single payment by id.
    async fn fetch_payment(&self, payment_id: &str) -> PaymentResult<GatewayPayment>;

    /// List payments matching the filter.
    async fn list_payments(&self, filter: &PaymentFilter) -> PaymentResult<Vec<GatewayPayment>>;

    /// Check the signature the checkout widget returned for `order_id|payment_id`.
    fn verify_checkout(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Shared gateway handle
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
