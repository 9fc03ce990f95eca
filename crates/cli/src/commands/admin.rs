//! Catalog product management commands.
//!
//! # Usage
//!
//! ```bash
//! fakestore admin create --title <T> --price <P> --description <D> --category <C> --image <URL>
//! fakestore admin update <ID> [--title <T>] [--price <P>] [--description <D>] [--category <C>] [--image <URL>]
//! fakestore admin delete <ID>
//! ```
//!
//! Input is checked against the product form rules before any request is
//! sent.

use fakestore_core::{ProductDraft, ProductId};
use fakestore_storefront::StorefrontError;
use rust_decimal::Decimal;
use tracing::info;

use super::log_product;
use crate::App;

/// Fields to change on update; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ProductChanges {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(image) = self.image {
            draft.image = image;
        }
    }
}

/// Create a product.
pub async fn create(app: &App, draft: &ProductDraft) -> Result<(), StorefrontError> {
    draft.validate()?;
    let product = app.catalog.create_product(draft).await?;
    info!("Product created");
    log_product(&product);
    Ok(())
}

/// Update a product, starting from its current catalog values.
pub async fn update(
    app: &App,
    id: ProductId,
    changes: ProductChanges,
) -> Result<(), StorefrontError> {
    let current = app.catalog.get_product(id).await?;
    let mut draft = ProductDraft::from(&current);
    changes.apply(&mut draft);
    draft.validate()?;

    let product = app.catalog.update_product(id, &draft).await?;
    info!("Product updated");
    log_product(&product);
    Ok(())
}

/// Delete a product.
pub async fn delete(app: &App, id: ProductId) -> Result<(), StorefrontError> {
    app.catalog.delete_product(id).await?;
    info!("Product {id} deleted");
    Ok(())
}
