//! Command implementations.
//!
//! Output goes through `tracing` at info level, like every other message
//! the CLI prints.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod products;

use std::sync::Arc;

use fakestore_core::Product;
use fakestore_storefront::auth::AuthStore;
use fakestore_storefront::cart::{CartEvent, CartSession, CartStore, Storage};
use tracing::info;

use crate::App;

/// Build the cart session for whoever is signed in and activate it.
///
/// Activation as a signed-in user folds any guest cart into the user cart;
/// the merge is announced once through a subscription.
pub fn open_session(app: &App) -> CartSession<Arc<dyn Storage>> {
    let auth = AuthStore::new(Arc::clone(&app.storage)).current();
    let mut session = CartSession::new(CartStore::new(Arc::clone(&app.storage)));

    session.subscribe(|event| {
        if let CartEvent::GuestCartMerged(merged) = event {
            info!(
                "Cart synchronized: {} item(s) from your guest cart were added to your account",
                merged.quantity
            );
        }
    });
    session.activate(auth.mode());
    session
}

/// One-line summary of a product.
pub fn log_product(product: &Product) {
    info!(
        "#{:<4} {:<60} {:>10}  [{}]",
        product.id,
        product.title,
        product.unit_price().to_string(),
        product.category
    );
}
