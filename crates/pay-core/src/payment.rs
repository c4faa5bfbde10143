//! # Payment Types
//!
//! Gateway payments, the tri-state status the API reports, and the
//! per-user transaction summary.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Prefix of every gateway payment id
pub const PAYMENT_ID_PREFIX: &str = "pay_";

/// `pay_` followed by one or more ASCII alphanumerics.
///
/// Ids are placed in gateway URLs, so anything else is refused before a
/// request is built.
pub fn is_valid_payment_id(id: &str) -> bool {
    id.strip_prefix(PAYMENT_ID_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Payment as reported by the gateway.
///
/// Only the fields the service reads are typed; everything else is kept in
/// `extra` and echoed back in `payment_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Amount in minor units
    pub amount: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Raw gateway status (`created`, `authorized`, `captured`, ...)
    pub status: String,

    #[serde(default)]
    pub order_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Notes; an object when set, `[]` otherwise
    #[serde(default)]
    pub notes: Value,

    /// Creation time, unix seconds
    #[serde(default)]
    pub created_at: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl GatewayPayment {
    /// Look up a string note
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).and_then(Value::as_str)
    }

    /// Tri-state status of this payment
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_gateway(&self.status)
    }

    /// Amount in major units (minor / 100)
    pub fn major_amount(&self) -> f64 {
        minor_to_major(self.amount)
    }
}

/// Simplified payment status reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    /// `captured → success`, `failed → failed`, anything else is pending
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "captured" => PaymentStatus::Success,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status used in transaction history; adds `refunded` to the tri-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
    Refunded,
    Pending,
}

impl TransactionStatus {
    pub fn from_gateway(raw: &str) -> Self {
        match raw {
            "refunded" => TransactionStatus::Refunded,
            other => match PaymentStatus::from_gateway(other) {
                PaymentStatus::Success => TransactionStatus::Success,
                PaymentStatus::Failed => TransactionStatus::Failed,
                PaymentStatus::Pending => TransactionStatus::Pending,
            },
        }
    }
}

/// One row of a user's payment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub payment_id: String,
    pub user_email: String,
    /// Major units; whole amounts serialize without a fraction (`199`, not `199.0`)
    #[serde(serialize_with = "serialize_major")]
    pub amount: f64,
    pub status: TransactionStatus,
    pub order_id: Option<String>,
    pub created_at: Option<i64>,
}

impl Transaction {
    /// Summarize a gateway payment for `user_email`
    pub fn from_payment(payment: &GatewayPayment, user_email: &str) -> Self {
        Self {
            payment_id: payment.id.clone(),
            user_email: user_email.to_string(),
            amount: payment.major_amount(),
            status: TransactionStatus::from_gateway(&payment.status),
            order_id: payment.order_id.clone(),
            created_at: payment.created_at,
        }
    }
}

/// Filter for gateway payment listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    /// Match on the `email` note
    pub email: Option<String>,
    /// Page size
    pub count: Option<u32>,
}

impl PaymentFilter {
    /// Filter on the `email` note
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            count: None,
        }
    }

    /// Builder: set page size
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Whether a payment satisfies this filter.
    ///
    /// The `email` note is compared ASCII case-insensitively, since mailbox
    /// casing differs between checkout and later lookups.
    pub fn matches(&self, payment: &GatewayPayment) -> bool {
        match &self.email {
            Some(email) => payment
                .note("email")
                .map(|n| n.eq_ignore_ascii_case(email))
                .unwrap_or(false),
            None => true,
        }
    }
}

fn serialize_major<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract() == 0.0 && *amount >= 0.0 && *amount <= u64::MAX as f64 {
        serializer.serialize_u64(*amount as u64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

/// Convert minor units to major units
pub fn minor_to_major(amount: u64) -> f64 {
    amount as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payment(status: &str, notes: Value) -> GatewayPayment {
        serde_json::from_value(json!({
            "id": "pay_29QQoUBi66xm2f",
            "entity": "payment",
            "amount": 19900,
            "currency": "INR",
            "status": status,
            "order_id": "order_9A33XWu170gUtm",
            "method": "upi",
            "captured": status == "captured",
            "notes": notes,
            "created_at": 1400826750
        }))
        .unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(PaymentStatus::from_gateway("captured"), PaymentStatus::Success);
        assert_eq!(PaymentStatus::from_gateway("failed"), PaymentStatus::Failed);
        for raw in ["created", "authorized", "refunded", "", "some_future_state"] {
            assert_eq!(PaymentStatus::from_gateway(raw), PaymentStatus::Pending);
        }
    }

    #[test]
    fn test_status_mapping_is_idempotent() {
        for raw in ["captured", "failed", "created"] {
            let once = PaymentStatus::from_gateway(raw);
            assert_eq!(PaymentStatus::from_gateway(once.as_str()), once);
        }
    }

    #[test]
    fn test_transaction_status_adds_refunded() {
        assert_eq!(TransactionStatus::from_gateway("refunded"), TransactionStatus::Refunded);
        assert_eq!(TransactionStatus::from_gateway("captured"), TransactionStatus::Success);
        assert_eq!(TransactionStatus::from_gateway("authorized"), TransactionStatus::Pending);
    }

    #[test]
    fn test_transaction_converts_to_major_units() {
        let p = payment("captured", json!({"email": "a@b.in"}));
        let tx = Transaction::from_payment(&p, "a@b.in");
        assert_eq!(tx.amount, 199.0);
        assert_eq!(tx.status, TransactionStatus::Success);
        assert_eq!(tx.order_id.as_deref(), Some("order_9A33XWu170gUtm"));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["amount"], json!(199));
        assert_eq!(json["status"], "success");

        let mut p = payment("captured", json!({"email": "a@b.in"}));
        p.amount = 19950;
        let json = serde_json::to_value(Transaction::from_payment(&p, "a@b.in")).unwrap();
        assert_eq!(json["amount"], json!(199.5));
    }

    #[test]
    fn test_payment_id_shape() {
        assert!(is_valid_payment_id("pay_29QQoUBi66xm2f"));
        for id in [
            "",
            "pay_",
            "order_9A33XWu170gUtm",
            "../orders/order_1",
            "pay_1/../../orders",
            "pay_1?expand=card",
            "pay_1%2F",
        ] {
            assert!(!is_valid_payment_id(id), "{id}");
        }
    }

    #[test]
    fn test_filter_matches_email_note() {
        let filter = PaymentFilter::by_email("a@b.in");
        assert!(filter.matches(&payment("captured", json!({"email": "A@B.in"}))));
        assert!(!filter.matches(&payment("captured", json!({"email": "c@d.in"}))));
        assert!(!filter.matches(&payment("captured", json!([]))));
        assert!(PaymentFilter::default().matches(&payment("captured", json!([]))));
    }

    #[test]
    fn test_payment_keeps_extra_fields() {
        let p = payment("captured", json!([]));
        assert_eq!(p.extra.get("captured"), Some(&json!(true)));
        assert_eq!(p.status(), PaymentStatus::Success);
    }
}
