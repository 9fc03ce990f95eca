//! Catalog product types.
//!
//! Products are owned by the remote catalog. The storefront only reads them,
//! snapshots them into cart lines, and writes them back through explicit
//! create/update calls built from a [`ProductDraft`].

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::id::ProductId;
use super::price::Price;

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price in dollars. Serialized as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category: String,
    /// Image URL. Kept as received; only drafts are validated.
    pub image: String,
    /// Write endpoints echo products without a rating.
    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Unit price with currency, for display.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating on a 0-5 scale.
    pub rate: f64,
    /// Number of ratings.
    pub count: u64,
}

/// Payload for creating or replacing a product.
///
/// The catalog assigns the ID, so a draft never carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub image: String,
}

impl ProductDraft {
    pub const MIN_TITLE_LEN: usize = 3;
    pub const MIN_DESCRIPTION_LEN: usize = 10;
    pub const MIN_CATEGORY_LEN: usize = 2;

    /// Check the draft against the product form schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductDraftError`] listing every field that fails, in form
    /// order (title, price, description, category, image).
    pub fn validate(&self) -> Result<(), ProductDraftError> {
        let mut fields = Vec::new();

        if self.title.trim().chars().count() < Self::MIN_TITLE_LEN {
            fields.push(FieldError::new(
                "title",
                format!("must be at least {} characters", Self::MIN_TITLE_LEN),
            ));
        }
        if self.price <= Decimal::ZERO {
            fields.push(FieldError::new("price", "must be a positive number"));
        }
        if self.description.trim().chars().count() < Self::MIN_DESCRIPTION_LEN {
            fields.push(FieldError::new(
                "description",
                format!(
                    "must be at least {} characters",
                    Self::MIN_DESCRIPTION_LEN
                ),
            ));
        }
        if self.category.trim().chars().count() < Self::MIN_CATEGORY_LEN {
            fields.push(FieldError::new("category", "is required"));
        }
        if Url::parse(self.image.trim()).is_err() {
            fields.push(FieldError::new("image", "must be a valid URL"));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ProductDraftError { fields })
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }
}

/// A single failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// A product draft failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid product: {}", format_fields(.fields))]
pub struct ProductDraftError {
    pub fields: Vec<FieldError>,
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
