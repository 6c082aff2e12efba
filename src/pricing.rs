// 🧮 Bundle Pricer
// Subtotal of price × months with an item-count volume discount

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// (minimum item count, discount fraction), highest tier first
pub const DISCOUNT_TIERS: &[(usize, f64)] = &[(3, 0.10), (2, 0.05)];

/// Ceiling for any line or bundle amount; larger values saturate here
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

// ============================================================================
// ITEMS / RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItem {
    /// Display only, never affects the price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub price: f64,

    /// Billing months; missing or < 1 counts as 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<i64>,
}

impl BundleItem {
    pub fn new(price: f64) -> Self {
        BundleItem {
            name: None,
            price,
            months: None,
        }
    }

    pub fn with_months(price: f64, months: i64) -> Self {
        BundleItem {
            name: None,
            price,
            months: Some(months),
        }
    }

    /// price × max(1, months), capped at MAX_AMOUNT; negative or non-finite
    /// prices count as zero
    pub fn line_total(&self) -> f64 {
        let price = if self.price.is_finite() && self.price > 0.0 {
            self.price
        } else {
            0.0
        };
        let months = self.months.unwrap_or(1).max(1);

        (price * months as f64).min(MAX_AMOUNT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundlePriceResult {
    pub item_count: usize,
    pub subtotal: f64,
    pub discount_pct: f64,
    pub discount_amount: f64,
    pub total: f64,
}

// ============================================================================
// PRICING
// ============================================================================

pub fn discount_for_count(count: usize) -> f64 {
    DISCOUNT_TIERS
        .iter()
        .find(|(min_items, _)| count >= *min_items)
        .map(|(_, pct)| *pct)
        .unwrap_or(0.0)
}

/// Half-up rounding to cents. Negative and NaN become 0; anything at or
/// above MAX_AMOUNT (including infinity) saturates to MAX_AMOUNT.
pub fn round_cents(amount: f64) -> f64 {
    if amount.is_nan() || amount <= 0.0 {
        return 0.0;
    }
    if amount >= MAX_AMOUNT {
        return MAX_AMOUNT;
    }

    // Nudge absorbs binary representation error (142.4999999… → 142.50)
    ((amount * 100.0) + 0.5 + 1e-7).floor() / 100.0
}

pub fn price_bundle(items: &[BundleItem]) -> BundlePriceResult {
    let mut raw_subtotal: f64 = items.iter().map(BundleItem::line_total).sum();
    if raw_subtotal > MAX_AMOUNT {
        warn!(items = items.len(), "Bundle subtotal capped at {}", MAX_AMOUNT);
        raw_subtotal = MAX_AMOUNT;
    }
    let discount_pct = discount_for_count(items.len());

    let subtotal = round_cents(raw_subtotal);
    let total = round_cents(raw_subtotal * (1.0 - discount_pct));
    let discount_amount = round_cents(subtotal - total);

    debug!(
        items = items.len(),
        subtotal,
        discount_pct,
        total,
        "Priced bundle"
    );

    BundlePriceResult {
        item_count: items.len(),
        subtotal,
        discount_pct,
        discount_amount,
        total,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle() {
        let result = price_bundle(&[]);

        assert_eq!(result.subtotal, 0.0);
        assert_eq!(result.discount_pct, 0.0);
        assert_eq!(result.total, 0.0);
        assert_eq!(result.item_count, 0);
    }

    #[test]
    fn test_single_item_no_discount() {
        let result = price_bundle(&[BundleItem::new(79.99)]);

        assert_eq!(result.subtotal, 79.99);
        assert_eq!(result.discount_pct, 0.0);
        assert_eq!(result.total, 79.99);
    }

    #[test]
    fn test_two_items_five_percent() {
        let items = vec![BundleItem::with_months(100.0, 1), BundleItem::with_months(50.0, 1)];
        let result = price_bundle(&items);

        assert_eq!(result.subtotal, 150.0);
        assert_eq!(result.discount_pct, 0.05);
        assert_eq!(result.total, 142.5);
        assert_eq!(result.discount_amount, 7.5);
    }

    #[test]
    fn test_three_items_ten_percent() {
        let items = vec![
            BundleItem::new(10.0),
            BundleItem::new(20.0),
            BundleItem::new(30.0),
            BundleItem::new(40.0),
        ];
        let result = price_bundle(&items);

        assert_eq!(result.subtotal, 100.0);
        assert_eq!(result.discount_pct, 0.10);
        assert_eq!(result.total, 90.0);
    }

    #[test]
    fn test_months_multiply() {
        let items = vec![BundleItem::with_months(29.99, 12), BundleItem::with_months(10.0, 0)];
        let result = price_bundle(&items);

        // 359.88 + 10.00 (months floored at 1)
        assert_eq!(result.subtotal, 369.88);
        // 369.88 × 0.95 = 351.386 → 351.39
        assert_eq!(result.total, 351.39);
    }

    #[test]
    fn test_negative_price_never_negative_total() {
        let items = vec![BundleItem::new(-50.0), BundleItem::new(f64::NAN)];
        let result = price_bundle(&items);

        assert_eq!(result.subtotal, 0.0);
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn test_huge_bundle_saturates_instead_of_zero() {
        let items = vec![
            BundleItem::with_months(1e300, i64::MAX),
            BundleItem::with_months(f64::MAX, 12),
        ];
        let result = price_bundle(&items);

        assert_eq!(result.subtotal, MAX_AMOUNT);
        assert_eq!(result.total, 950_000_000_000.0);
        assert!(result.total > 0.0);
        assert_eq!(round_cents(f64::INFINITY), MAX_AMOUNT);
    }

    #[test]
    fn test_round_cents_half_up() {
        assert_eq!(round_cents(1.005), 1.01);
        assert_eq!(round_cents(2.675), 2.68);
        assert_eq!(round_cents(0.004), 0.0);
        assert_eq!(round_cents(-3.0), 0.0);
    }

    #[test]
    fn test_discount_tiers() {
        assert_eq!(discount_for_count(0), 0.0);
        assert_eq!(discount_for_count(1), 0.0);
        assert_eq!(discount_for_count(2), 0.05);
        assert_eq!(discount_for_count(3), 0.10);
        assert_eq!(discount_for_count(12), 0.10);
    }

    #[test]
    fn test_deserialize_item_defaults() {
        let item: BundleItem = serde_json::from_str(r#"{"price": 19.5}"#).unwrap();
        assert_eq!(item.months, None);
        assert_eq!(item.line_total(), 19.5);
    }
}
