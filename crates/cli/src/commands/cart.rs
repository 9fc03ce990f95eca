//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! fakestore cart show
//! fakestore cart add <PRODUCT_ID> [--quantity <N>]
//! fakestore cart set <ITEM_ID> <QUANTITY>
//! fakestore cart remove <ITEM_ID>
//! fakestore cart clear
//! ```

use fakestore_core::{CartItemId, ProductId};
use fakestore_storefront::StorefrontError;
use fakestore_storefront::cart::{CartError, CartSession, Storage};
use tracing::{info, warn};

use super::open_session;
use crate::App;

/// Log every line and the totals.
pub fn log_cart<S: Storage>(session: &CartSession<S>) -> Result<(), StorefrontError> {
    let (Some(cart), Some(totals)) = (session.cart(), session.totals()) else {
        return Err(CartError::NotInitialized.into());
    };

    if cart.is_empty() {
        info!("Your cart is empty");
        return Ok(());
    }

    let noun = if totals.item_count == 1 { "item" } else { "items" };
    info!("Your cart ({} {noun})", totals.item_count);
    for item in &cart.items {
        info!(
            "  [{}] {} - {} x {} = {}",
            item.id,
            item.product.title,
            item.product.unit_price(),
            item.quantity,
            fakestore_core::Price::usd(item.line_total())
        );
    }
    info!("  Subtotal: {}", totals.subtotal_price());
    info!("  Tax:      {}", totals.tax_price());
    if totals.is_free_shipping() {
        info!("  Shipping: Free");
    } else {
        info!("  Shipping: {}", totals.shipping_price());
    }
    info!("  Total:    {}", totals.total_price());
    Ok(())
}

pub fn show(app: &App) -> Result<(), StorefrontError> {
    log_cart(&open_session(app))
}

/// Fetch a product from the catalog and add it.
pub async fn add(app: &App, product_id: ProductId, quantity: u32) -> Result<(), StorefrontError> {
    let product = app.catalog.get_product(product_id).await?;
    let mut session = open_session(app);
    session.add_to_cart(&product, quantity)?;
    info!("{} ({quantity}) has been added to your cart", product.title);
    log_cart(&session)
}

pub fn set_quantity(app: &App, item_id: CartItemId, quantity: i64) -> Result<(), StorefrontError> {
    let mut session = open_session(app);
    ensure_item(&session, item_id)?;
    session.update_quantity(item_id, quantity)?;
    log_cart(&session)
}

pub fn remove(app: &App, item_id: CartItemId) -> Result<(), StorefrontError> {
    let mut session = open_session(app);
    ensure_item(&session, item_id)?;
    session.remove_item(item_id)?;
    log_cart(&session)
}

pub fn clear(app: &App) -> Result<(), StorefrontError> {
    let mut session = open_session(app);
    session.clear_cart()?;
    info!("Cart cleared");
    Ok(())
}

/// The store treats unknown IDs as a no-op; the CLI reports them.
fn ensure_item<S: Storage>(
    session: &CartSession<S>,
    item_id: CartItemId,
) -> Result<(), StorefrontError> {
    if session.cart().and_then(|cart| cart.item(item_id)).is_none() {
        warn!("No cart line with ID {item_id}; run `fakestore cart show` to list them");
        return Err(StorefrontError::NotFound(format!("cart item {item_id}")));
    }
    Ok(())
}
