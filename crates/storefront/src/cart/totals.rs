//! Cart totals: subtotal, tax, shipping, total, and item count.
//!
//! Rates are fixed store policy, not derived from the buyer's location.

use fakestore_core::{Cart, CartTotals};
use rust_decimal::Decimal;

/// Sales tax applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Orders with a subtotal strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Shipping charged at or below the threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Derive the totals for `cart`.
///
/// Pure: the same cart always yields the same totals. Amounts are exact;
/// round only for display. Sums past the `Decimal` range saturate.
#[must_use]
pub fn compute_totals(cart: &Cart) -> CartTotals {
    let subtotal = cart
        .items
        .iter()
        .map(fakestore_core::CartItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let tax = subtotal.saturating_mul(TAX_RATE);
    let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    };
    let item_count = cart.items.iter().map(|item| u64::from(item.quantity)).sum();

    CartTotals {
        subtotal,
        tax,
        shipping,
        total: subtotal.saturating_add(tax).saturating_add(shipping),
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fakestore_core::{CartItem, CartItemId, Product, ProductId, Rating};

    use super::*;

    fn cart(lines: &[(i64, u32)]) -> Cart {
        Cart {
            items: lines
                .iter()
                .enumerate()
                .map(|(i, &(cents, quantity))| CartItem {
                    id: CartItemId::new(i64::try_from(i).unwrap_or_default() + 1),
                    product: Product {
                        id: ProductId::new(i64::try_from(i).unwrap_or_default() + 1),
                        title: "p".to_string(),
                        price: Decimal::new(cents, 2),
                        description: "d".to_string(),
                        category: "c".to_string(),
                        image: "i".to_string(),
                        rating: Rating::default(),
                    },
                    quantity,
                })
                .collect(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(TAX_RATE, Decimal::new(8, 2));
        assert_eq!(FREE_SHIPPING_THRESHOLD, Decimal::from(100));
        assert_eq!(FLAT_SHIPPING, Decimal::from(10));
    }

    #[test]
    fn test_empty_cart() {
        let totals = compute_totals(&cart(&[]));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.shipping, FLAT_SHIPPING);
        assert_eq!(totals.total, FLAT_SHIPPING);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_tax_and_flat_shipping() {
        // 2 × $25.00
        let totals = compute_totals(&cart(&[(2500, 2)]));
        assert_eq!(totals.subtotal, Decimal::from(50));
        assert_eq!(totals.tax, Decimal::from(4));
        assert_eq!(totals.shipping, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(64));
        assert_eq!(totals.item_count, 2);
        assert!(!totals.is_free_shipping());
    }

    #[test]
    fn test_free_shipping_boundary() {
        let at = compute_totals(&cart(&[(10000, 1)]));
        assert_eq!(at.subtotal, Decimal::from(100));
        assert_eq!(at.shipping, Decimal::from(10));

        let above = compute_totals(&cart(&[(10001, 1)]));
        assert_eq!(above.subtotal, Decimal::new(10001, 2));
        assert_eq!(above.shipping, Decimal::ZERO);
        assert!(above.is_free_shipping());
    }

    #[test]
    fn test_multiple_lines() {
        // 109.95 × 1 + 22.30 × 3 = 176.85
        let totals = compute_totals(&cart(&[(10995, 1), (2230, 3)]));
        assert_eq!(totals.subtotal, Decimal::new(17685, 2));
        assert_eq!(totals.tax, Decimal::new(14148, 3));
        assert_eq!(totals.total, Decimal::new(190_998, 3));
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.total_price().to_string(), "$191.00");
    }

    #[test]
    fn test_huge_cart_saturates() {
        let mut huge = cart(&[(100, u32::MAX), (100, u32::MAX)]);
        for item in &mut huge.items {
            item.product.price = Decimal::from_i128_with_scale(20_000_000_000_000_000_000, 0);
        }
        let totals = compute_totals(&huge);
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.total, Decimal::MAX);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.item_count, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_idempotent() {
        let c = cart(&[(1999, 3), (505, 7)]);
        assert_eq!(compute_totals(&c), compute_totals(&c));
    }
}
