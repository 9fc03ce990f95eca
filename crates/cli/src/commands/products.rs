//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! fakestore products list [--category <NAME>]
//! fakestore products get <ID>
//! fakestore products categories
//! ```

use fakestore_core::ProductId;
use fakestore_storefront::catalog::CatalogError;
use tracing::info;

use super::log_product;
use crate::App;

/// List every product, or the products in one category.
pub async fn list(app: &App, category: Option<&str>) -> Result<(), CatalogError> {
    let products = match category {
        Some(name) => app.catalog.list_products_in_category(name).await?,
        None => app.catalog.list_products().await?,
    };

    if products.is_empty() {
        info!("No products found");
        return Ok(());
    }

    for product in &products {
        log_product(product);
    }
    info!("{} product(s)", products.len());
    Ok(())
}

/// Show one product in full.
pub async fn show(app: &App, id: ProductId) -> Result<(), CatalogError> {
    let product = app.catalog.get_product(id).await?;

    info!("{}", product.title);
    info!("  ID:       {}", product.id);
    info!("  Price:    {}", product.unit_price());
    info!("  Category: {}", product.category);
    info!(
        "  Rating:   {:.1} ({} reviews)",
        product.rating.rate, product.rating.count
    );
    info!("  Image:    {}", product.image);
    info!("  {}", product.description);
    Ok(())
}

/// List category names.
pub async fn categories(app: &App) -> Result<(), CatalogError> {
    for name in app.catalog.list_categories().await? {
        info!("{name}");
    }
    Ok(())
}
