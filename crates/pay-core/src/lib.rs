//! # pay-core
//!
//! Core types and traits for the pricing and order-intake service.
//!
//! This crate provides:
//! - `PaymentGateway` trait for the payment processor
//! - `PricingStore` trait for the relational store
//! - `PricingRecord` and the discounted price calculation
//! - `OrderDraft` validation into `OrderRequest`
//! - `PaymentStatus` tri-state mapping and `Transaction` summaries
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{OrderDraft, PaymentGateway};
//!
//! let request: OrderDraft = serde_json::from_str(r#"{"amount":19900,"currency":"INR"}"#)?;
//! let order = gateway.create_order(&request.validate()?).await?;
//! ```

pub mod enrollment;
pub mod error;
pub mod event;
pub mod gateway;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod store;

// Re-exports for convenience
pub use enrollment::{CheckoutProof, Enrollment, EnrollmentDraft, EnrollmentStatus, PaymentRecord};
pub use error::{PaymentError, PaymentResult};
pub use event::{WebhookEvent, WebhookEventType};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use order::{GatewayOrder, OrderDraft, OrderRequest};
pub use payment::{
    is_valid_payment_id, GatewayPayment, PaymentFilter, PaymentStatus, Transaction,
    TransactionStatus,
};
pub use pricing::{PricingQuote, PricingRecord};
pub use store::{BoxedPricingStore, PricingStore};
