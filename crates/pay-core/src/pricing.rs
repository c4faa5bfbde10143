//! # Pricing
//!
//! The single authoritative price record and the discounted price derived
//! from it on every read.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Base price seeded when the store holds no pricing row
pub const DEFAULT_BASE_PRICE: Decimal = Decimal::from_parts(19900, 0, 0, false, 2);

/// Discount seeded when the store holds no pricing row
pub const DEFAULT_DISCOUNT_PERCENTAGE: Decimal = Decimal::ZERO;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Stored pricing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecord {
    /// Row id (`None` before the row has been written)
    pub id: Option<i64>,

    /// Base price in major units
    pub base_price: Decimal,

    /// Discount in percent, expected within 0..=100
    pub discount_percentage: Decimal,

    /// Last update, unix milliseconds
    pub last_updated: i64,
}

impl PricingRecord {
    /// Create an unsaved record stamped with the current time
    pub fn new(base_price: Decimal, discount_percentage: Decimal) -> Self {
        Self {
            id: None,
            base_price,
            discount_percentage,
            last_updated: Utc::now().timestamp_millis(),
        }
    }

    /// Builder: set the row id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Discount clamped into `0..=100`
    pub fn effective_discount(&self) -> Decimal {
        self.discount_percentage.clamp(Decimal::ZERO, HUNDRED)
    }

    /// `base_price × (1 − discount/100)`, rounded to 2 places
    pub fn final_price(&self) -> Decimal {
        let factor = Decimal::ONE - self.effective_discount() / HUNDRED;
        (self.base_price * factor)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Fixed-point rendering for the pricing endpoint
    pub fn quote(&self) -> PricingQuote {
        PricingQuote {
            base_price: format_fixed(self.base_price, 2),
            discount_percentage: format_fixed(self.discount_percentage, 1),
            final_price: format_fixed(self.final_price(), 2),
        }
    }
}

impl Default for PricingRecord {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PRICE, DEFAULT_DISCOUNT_PERCENTAGE)
    }
}

/// Pricing as returned to clients: money with 2 decimals, percentage with 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub base_price: String,
    pub discount_percentage: String,
    pub final_price: String,
}

fn format_fixed(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_record() {
        let record = PricingRecord::default();
        assert_eq!(record.base_price, dec!(199.00));
        assert_eq!(record.discount_percentage, dec!(0));
        assert!(record.id.is_none());
    }

    #[test]
    fn test_final_price_without_discount() {
        let quote = PricingRecord::default().quote();
        assert_eq!(quote.base_price, "199.00");
        assert_eq!(quote.discount_percentage, "0.0");
        assert_eq!(quote.final_price, "199.00");
    }

    #[test]
    fn test_final_price_with_discount() {
        let record = PricingRecord::new(dec!(199.00), dec!(15));
        assert_eq!(record.final_price(), dec!(169.15));

        let record = PricingRecord::new(dec!(999), dec!(33.3));
        // 999 * 0.667 = 666.333
        assert_eq!(record.final_price(), dec!(666.33));
    }

    #[test]
    fn test_final_price_rounds_half_away_from_zero() {
        // 10.01 * 0.5 = 5.005
        let record = PricingRecord::new(dec!(10.01), dec!(50));
        assert_eq!(record.final_price(), dec!(5.01));
    }

    #[test]
    fn test_full_discount_is_free() {
        let record = PricingRecord::new(dec!(199), dec!(100));
        assert_eq!(record.quote().final_price, "0.00");
    }

    #[test]
    fn test_out_of_range_discount_is_clamped() {
        let record = PricingRecord::new(dec!(50), dec!(120));
        assert_eq!(record.final_price(), dec!(0.00));

        let record = PricingRecord::new(dec!(50), dec!(-10));
        assert_eq!(record.final_price(), dec!(50.00));
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = PricingRecord::new(dec!(250), dec!(12.5)).quote();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["basePrice"], "250.00");
        assert_eq!(json["discountPercentage"], "12.5");
        assert_eq!(json["finalPrice"], "218.75");
    }
}
