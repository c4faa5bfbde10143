//! # Signature Verification
//!
//! Razorpay signs two things with HMAC-SHA256, hex encoded:
//! - checkout responses: `order_id|payment_id` keyed with the API key secret
//! - webhook bodies: the raw request body keyed with the webhook secret

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `message`
pub fn compute_hmac_sha256(secret: &str, message: &[u8]) -> String {
    // new_from_slice only fails for fixed-size keys; HMAC accepts any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Check the signature returned by the checkout widget
pub fn verify_checkout_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let payload = format!("{}|{}", order_id, payment_id);
    let expected = compute_hmac_sha256(key_secret, payload.as_bytes());
    !expected.is_empty() && constant_time_compare(&expected, signature.trim())
}

/// Check the `X-Razorpay-Signature` header against the raw body
pub fn verify_webhook_signature(webhook_secret: &str, body: &[u8], signature: &str) -> bool {
    let expected = compute_hmac_sha256(webhook_secret, body);
    !expected.is_empty() && constant_time_compare(&expected, signature.trim())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
