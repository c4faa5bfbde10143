use async_trait::async_trait;
use pay_core::{PaymentRecord, PaymentResult, PricingRecord, PricingStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Enrollments kept by default before the oldest are dropped
pub const DEFAULT_PAYMENT_CAPACITY: usize = 1_000;

#[derive(Default)]
struct PaymentLog {
    records: VecDeque<PaymentRecord>,
    last_id: i64,
}

/// A thread-safe in-memory store.
///
/// Used when no database is configured, and in tests. The pricing row is
/// read-only once seeded. Enrollments are kept in a bounded log: once
/// `capacity` is reached the oldest record is evicted. Ids keep increasing
/// across evictions.
#[derive(Clone)]
pub struct MemoryStore {
    pricing: Arc<RwLock<Option<PricingRecord>>>,
    payments: Arc<RwLock<PaymentLog>>,
    capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            pricing: Arc::default(),
            payments: Arc::default(),
            capacity: DEFAULT_PAYMENT_CAPACITY,
        }
    }
}

impl MemoryStore {
    /// Creates an empty store (no pricing row until `ensure_schema`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given pricing row.
    pub fn with_pricing(record: PricingRecord) -> Self {
        Self {
            pricing: Arc::new(RwLock::new(Some(record.with_id(1)))),
            ..Self::default()
        }
    }

    /// Builder: keep at most `capacity` enrollments (at least one)
    pub fn with_payment_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Recorded enrollments still held, oldest first.
    pub async fn payments(&self) -> Vec<PaymentRecord> {
        self.payments.read().await.records.iter().cloned().collect()
    }
}

#[async_trait]
impl PricingStore for MemoryStore {
    async fn ensure_schema(&self) -> PaymentResult<()> {
        let mut pricing = self.pricing.write().await;
        if pricing.is_none() {
            *pricing = Some(PricingRecord::default().with_id(1));
        }
        Ok(())
    }

    async fn current_pricing(&self) -> PaymentResult<Option<PricingRecord>> {
        Ok(self.pricing.read().await.clone())
    }

    async fn record_payment(&self, record: &PaymentRecord) -> PaymentResult<i64> {
        let mut log = self.payments.write().await;
        log.last_id += 1;
        let id = log.last_id;

        while log.records.len() >= self.capacity {
            if let Some(evicted) = log.records.pop_front() {
                debug!("Evicted enrollment {} from memory store", evicted.payment_id);
            }
        }

        let mut stored = record.clone();
        stored.id = Some(id);
        log.records.push_back(stored);
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::EnrollmentStatus;
    use rust_decimal_macros::dec;

    fn record(payment_id: &str) -> PaymentRecord {
        PaymentRecord {
            id: None,
            full_name: "Asha Rao".to_string(),
            phone: "9800000000".to_string(),
            email: "asha@example.in".to_string(),
            payment_id: payment_id.to_string(),
            order_id: None,
            amount: Some(19900),
            status: EnrollmentStatus::Unverified,
            date: 0,
        }
    }

    #[tokio::test]
    async fn test_empty_store_has_no_pricing() {
        let store = MemoryStore::new();
        assert!(store.current_pricing().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_schema_seeds_once() {
        let store = MemoryStore::with_pricing(PricingRecord::new(dec!(499), dec!(10)));
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        let pricing = store.current_pricing().await.unwrap().unwrap();
        assert_eq!(pricing.base_price, dec!(499));

        let fresh = MemoryStore::new();
        fresh.ensure_schema().await.unwrap();
        let pricing = fresh.current_pricing().await.unwrap().unwrap();
        assert_eq!(pricing.quote().final_price, "199.00");
    }

    #[tokio::test]
    async fn test_record_payment_assigns_ids() {
        let store = MemoryStore::new();
        assert_eq!(store.record_payment(&record("pay_1")).await.unwrap(), 1);
        assert_eq!(store.record_payment(&record("pay_2")).await.unwrap(), 2);

        let payments = store.payments().await;
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[1].id, Some(2));
        assert_eq!(payments[1].payment_id, "pay_2");
    }

    #[tokio::test]
    async fn test_payment_log_is_bounded() {
        let store = MemoryStore::new().with_payment_capacity(3);
        for i in 1..=5 {
            let id = store.record_payment(&record(&format!("pay_{i}"))).await.unwrap();
            assert_eq!(id, i);
        }

        let payments = store.payments().await;
        assert_eq!(payments.len(), 3);
        assert_eq!(payments[0].payment_id, "pay_3");
        assert_eq!(payments[2].id, Some(5));
    }

    #[tokio::test]
    async fn test_default_capacity() {
        let store = MemoryStore::new();
        for i in 0..DEFAULT_PAYMENT_CAPACITY + 10 {
            store.record_payment(&record(&format!("pay_{i}"))).await.unwrap();
        }
        assert_eq!(store.payments().await.len(), DEFAULT_PAYMENT_CAPACITY);
    }
}
