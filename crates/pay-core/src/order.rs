//! # Order Types
//!
//! Order intake: the client draft, its validated form, and the order object
//! the gateway returns.

use crate::error::{PaymentError, PaymentResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Smallest order the gateway accepts, in minor units
pub const MIN_ORDER_AMOUNT: u64 = 100;

/// Largest order accepted, in minor units
pub const MAX_ORDER_AMOUNT: u64 = 1_000_000_000;

/// Gateway limit on receipt length
pub const MAX_RECEIPT_LEN: usize = 40;

/// Gateway limit on the number of note entries
pub const MAX_NOTES: usize = 15;

/// Order creation body as sent by the client, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    /// Amount in minor units, as a JSON integer or integer string
    #[serde(default)]
    pub amount: Option<Value>,

    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: Option<String>,

    /// Merchant receipt id (generated when absent)
    #[serde(default)]
    pub receipt: Option<String>,

    /// Free-form notes forwarded to the gateway
    #[serde(default)]
    pub notes: HashMap<String, String>,
}

impl OrderDraft {
    /// Validate the draft into an order request.
    ///
    /// Missing fields are reported together before any other check runs.
    pub fn validate(self) -> PaymentResult<OrderRequest> {
        let mut missing = Vec::new();
        if is_blank_value(self.amount.as_ref()) {
            missing.push("amount");
        }
        if self.currency.as_deref().map_or(true, |c| c.trim().is_empty()) {
            missing.push("currency");
        }
        if !missing.is_empty() {
            return Err(PaymentError::missing(missing));
        }

        let amount = parse_amount(self.amount.as_ref().unwrap_or(&Value::Null))?;
        let currency = normalize_currency(self.currency.as_deref().unwrap_or_default())?;

        let receipt = match self.receipt.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => {
                if r.len() > MAX_RECEIPT_LEN {
                    return Err(PaymentError::InvalidRequest(format!(
                        "receipt must be at most {} characters",
                        MAX_RECEIPT_LEN
                    )));
                }
                r.to_string()
            }
            _ => generate_receipt(),
        };

        if self.notes.len() > MAX_NOTES {
            return Err(PaymentError::InvalidRequest(format!(
                "at most {} notes are allowed",
                MAX_NOTES
            )));
        }

        Ok(OrderRequest {
            amount,
            currency,
            receipt,
            payment_capture: true,
            notes: self.notes,
        })
    }
}

/// Validated order creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Amount in minor units
    pub amount: u64,

    /// Upper-case ISO 4217 code
    pub currency: String,

    /// Merchant receipt id
    pub receipt: String,

    /// Capture payments automatically once authorized
    pub payment_capture: bool,

    /// Notes forwarded to the gateway
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notes: HashMap<String, String>,
}

impl OrderRequest {
    /// Create a request with a generated receipt
    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            receipt: generate_receipt(),
            payment_capture: true,
            notes: HashMap::new(),
        }
    }

    /// Builder: set receipt
    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = receipt.into();
        self
    }

    /// Builder: add a note
    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// Order as created by the gateway.
///
/// Fields the service does not model are kept in `extra` so the full object
/// reaches the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Amount in minor units
    pub amount: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<u64>,

    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    /// Notes; the gateway sends `[]` when there are none
    #[serde(default)]
    pub notes: Value,

    /// Creation time, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Receipt id used when the client supplies none
pub fn generate_receipt() -> String {
    format!("receipt_{}", Utc::now().timestamp_millis())
}

fn is_blank_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse an amount in minor units, rejecting anything non-integral.
pub fn parse_amount(value: &Value) -> PaymentResult<u64> {
    let amount = match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else if n.as_i64().is_some() {
                return Err(invalid_amount("amount must be positive"));
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() != 0.0 || !f.is_finite() {
                    return Err(invalid_amount(
                        "amount must be an integer number of minor units",
                    ));
                }
                if f < 0.0 {
                    return Err(invalid_amount("amount must be positive"));
                }
                if f > MAX_ORDER_AMOUNT as f64 {
                    return Err(out_of_range());
                }
                f as u64
            }
        }
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(v) => v,
                Err(_) if s.parse::<i64>().is_ok() => {
                    return Err(invalid_amount("amount must be positive"))
                }
                Err(_) if s.parse::<f64>().is_ok() => {
                    return Err(invalid_amount(
                        "amount must be an integer number of minor units",
                    ))
                }
                Err(_) => return Err(invalid_amount("amount is not a number")),
            }
        }
        _ => return Err(invalid_amount("amount is not a number")),
    };

    if amount == 0 {
        return Err(invalid_amount("amount must be positive"));
    }
    if !(MIN_ORDER_AMOUNT..=MAX_ORDER_AMOUNT).contains(&amount) {
        return Err(out_of_range());
    }
    Ok(amount)
}

/// Upper-case a three letter currency code
pub fn normalize_currency(currency: &str) -> PaymentResult<String> {
    let code = currency.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PaymentError::UnsupportedCurrency {
            currency: code.to_string(),
        });
    }
    Ok(code.to_ascii_uppercase())
}

fn invalid_amount(message: &str) -> PaymentError {
    PaymentError::InvalidAmount {
        message: message.to_string(),
    }
}

fn out_of_range() -> PaymentError {
    PaymentError::InvalidAmount {
        message: format!(
            "amount must be between {} and {} minor units",
            MIN_ORDER_AMOUNT, MAX_ORDER_AMOUNT
        ),
    }
}
