//! # Enrollment Types
//!
//! Client-asserted payment completion and the record kept for it.

use crate::error::{PaymentError, PaymentResult};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Enrollment body as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentDraft {
    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: Option<String>,
    /// Phone number; clients send it as a string or a bare number
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "paymentId")]
    pub razorpay_payment_id: Option<String>,
    #[serde(default, alias = "orderId")]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    /// Amount in minor units, informational only; unreadable values are dropped
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<u64>,
}

impl EnrollmentDraft {
    /// Check required fields, naming every one that is absent or blank
    pub fn validate(self) -> PaymentResult<Enrollment> {
        let mut missing = Vec::new();
        let name = required(self.name, "name", &mut missing);
        let phone = required(self.phone, "phone", &mut missing);
        let email = required(self.email, "email", &mut missing);
        let payment_id = required(self.razorpay_payment_id, "razorpay_payment_id", &mut missing);
        if !missing.is_empty() {
            return Err(PaymentError::missing(missing));
        }

        // Half a proof cannot be checked, so the enrollment stays unverified
        let checkout = match (non_blank(self.razorpay_order_id), non_blank(self.razorpay_signature)) {
            (Some(order_id), Some(signature)) => Some(CheckoutProof { order_id, signature }),
            _ => None,
        };

        Ok(Enrollment {
            full_name: name,
            phone,
            email,
            payment_id,
            checkout,
            amount: self.amount,
        })
    }
}

/// Order id and signature returned by the gateway's checkout widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutProof {
    pub order_id: String,
    pub signature: String,
}

/// Validated enrollment
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub payment_id: String,
    pub checkout: Option<CheckoutProof>,
    pub amount: Option<u64>,
}

impl Enrollment {
    /// Record to persist for this enrollment
    pub fn to_record(&self, status: EnrollmentStatus) -> PaymentRecord {
        PaymentRecord {
            id: None,
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            payment_id: self.payment_id.clone(),
            order_id: self.checkout.as_ref().map(|c| c.order_id.clone()),
            amount: self.amount,
            status,
            date: Utc::now().timestamp_millis(),
        }
    }
}

/// How far an enrollment was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Client assertion only
    Unverified,
    /// Checkout signature matched
    Verified,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Unverified => "unverified",
            EnrollmentStatus::Verified => "verified",
        }
    }
}

/// Stored enrollment / payment attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Option<i64>,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub payment_id: String,
    pub order_id: Option<String>,
    /// Minor units
    pub amount: Option<u64>,
    pub status: EnrollmentStatus,
    /// Unix milliseconds
    pub date: i64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match non_blank(value) {
        Some(v) => v,
        None => {
            missing.push(field);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(body: serde_json::Value) -> EnrollmentDraft {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_full_name_alias() {
        let enrollment = draft(json!({
            "fullName": "Asha Rao",
            "phone": "9800000000",
            "email": "asha@example.in",
            "razorpay_payment_id": "pay_123"
        }))
        .validate()
        .unwrap();

        assert_eq!(enrollment.full_name, "Asha Rao");
        assert!(enrollment.checkout.is_none());
    }

    #[test]
    fn test_missing_fields_are_named() {
        let err = draft(json!({"name": "Asha", "phone": " "})).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing parameters: phone, email, razorpay_payment_id"
        );
    }

    #[test]
    fn test_partial_checkout_proof_is_unverified() {
        let enrollment = draft(json!({
            "name": "Asha",
            "phone": "98",
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1",
            "razorpay_order_id": "order_1"
        }))
        .validate()
        .unwrap();
        assert!(enrollment.checkout.is_none());

        let enrollment = draft(json!({
            "name": "Asha",
            "phone": "98",
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "abc"
        }))
        .validate()
        .unwrap();
        assert!(enrollment.checkout.is_none());
    }

    #[test]
    fn test_numeric_phone_and_string_amount() {
        let enrollment = draft(json!({
            "name": "Asha",
            "phone": 9800000000u64,
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1",
            "amount": "19900"
        }))
        .validate()
        .unwrap();
        assert_eq!(enrollment.phone, "9800000000");
        assert_eq!(enrollment.amount, Some(19900));

        let enrollment = draft(json!({
            "name": "Asha",
            "phone": "98",
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1",
            "amount": "199.00"
        }))
        .validate()
        .unwrap();
        assert_eq!(enrollment.amount, None);
    }

    #[test]
    fn test_null_phone_is_missing() {
        let err = draft(json!({
            "name": "Asha",
            "phone": null,
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing parameters: phone");
    }

    #[test]
    fn test_record_carries_order_id() {
        let enrollment = draft(json!({
            "name": "Asha",
            "phone": "98",
            "email": "a@b.in",
            "razorpay_payment_id": "pay_1",
            "razorpay_order_id": "order_1",
            "razorpay_signature": "abc",
            "amount": 19900
        }))
        .validate()
        .unwrap();

        let record = enrollment.to_record(EnrollmentStatus::Verified);
        assert_eq!(record.order_id.as_deref(), Some("order_1"));
        assert_eq!(record.amount, Some(19900));
        assert_eq!(record.status.as_str(), "verified");
    }
}
