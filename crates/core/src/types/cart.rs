//! Cart value types.
//!
//! The serialized form is the persisted cart format:
//!
//! ```json
//! {"items":[{"id":1700000000000,"product":{...},"quantity":2}],"lastUpdated":"2024-05-01T12:00:00Z"}
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Price;
use super::product::Product;

/// One product-quantity pairing within a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Locally generated, unique within the cart.
    pub id: CartItemId,
    /// Snapshot of the product at the time it was added.
    pub product: Product,
    /// Always at least 1 once persisted.
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity` for this line, saturating at the `Decimal` range.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// The ordered line items of one shopping session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Line items in insertion order.
    pub items: Vec<CartItem>,
    pub last_updated: DateTime<Utc>,
}

impl Cart {
    /// A cart with no items, stamped now.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line holding `product_id`, if any.
    #[must_use]
    pub fn item_for_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    /// The line with the given cart item ID, if any.
    #[must_use]
    pub fn item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Whether both carts hold the same lines, ignoring `last_updated`.
    #[must_use]
    pub fn same_items(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

/// Monetary summary derived from a cart. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub item_count: u64,
}

impl CartTotals {
    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    #[must_use]
    pub fn subtotal_price(&self) -> Price {
        Price::usd(self.subtotal)
    }

    #[must_use]
    pub fn tax_price(&self) -> Price {
        Price::usd(self.tax)
    }

    #[must_use]
    pub fn shipping_price(&self) -> Price {
        Price::usd(self.shipping)
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::Rating;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            description: "A product".to_string(),
            category: "electronics".to_string(),
            image: "https://fakestoreapi.com/img/1.jpg".to_string(),
            rating: Rating::default(),
        }
    }

    #[test]
    fn test_persisted_format() {
        let cart = Cart {
            items: vec![CartItem {
                id: CartItemId::new(1_714_564_800_000),
                product: product(3, 5599),
                quantity: 2,
            }],
            last_updated: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["lastUpdated"], "2024-05-01T12:00:00Z");
        assert_eq!(value["items"][0]["id"], 1_714_564_800_000_i64);
        assert_eq!(value["items"][0]["quantity"], 2);
        assert_eq!(value["items"][0]["product"]["id"], 3);
    }

    #[test]
    fn test_reads_browser_timestamp() {
        let json = r#"{"items":[],"lastUpdated":"2024-05-01T12:00:00.000Z"}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_quantity_is_malformed() {
        let json = r#"{"items":[{"id":1,"product":{"id":1,"title":"t","price":1,"description":"d","category":"c","image":"i"},"quantity":-1}],"lastUpdated":"2024-05-01T12:00:00Z"}"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_lookup_helpers() {
        let cart = Cart {
            items: vec![CartItem {
                id: CartItemId::new(10),
                product: product(7, 100),
                quantity: 3,
            }],
            last_updated: Utc::now(),
        };
        assert_eq!(cart.item_for_product(ProductId::new(7)).unwrap().quantity, 3);
        assert!(cart.item(CartItemId::new(11)).is_none());
        assert_eq!(cart.items[0].line_total(), Decimal::from(3));
    }

    #[test]
    fn test_line_total_saturates() {
        let mut expensive = product(1, 100);
        expensive.price = Decimal::from_i128_with_scale(20_000_000_000_000_000_000, 0);
        let item = CartItem {
            id: CartItemId::new(1),
            product: expensive,
            quantity: u32::MAX,
        };
        assert_eq!(item.line_total(), Decimal::MAX);
    }
}
