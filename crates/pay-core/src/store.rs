//! # Pricing Store Trait
//!
//! Persistence seam for the pricing row and enrollment records.

use crate::enrollment::PaymentRecord;
use crate::error::PaymentResult;
use crate::pricing::PricingRecord;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PricingStore: Send + Sync {
    /// Create tables if absent and seed the default pricing row when empty.
    /// Safe to call repeatedly.
    async fn ensure_schema(&self) -> PaymentResult<()>;

    /// The authoritative pricing row, if any.
    async fn current_pricing(&self) -> PaymentResult<Option<PricingRecord>>;

    /// Persist an enrollment record and return its id.
    async fn record_payment(&self, record: &PaymentRecord) -> PaymentResult<i64>;

    /// Backend name (for logging and health output).
    fn backend_name(&self) -> &'static str;
}

/// Shared store handle
pub type BoxedPricingStore = Arc<dyn PricingStore>;
