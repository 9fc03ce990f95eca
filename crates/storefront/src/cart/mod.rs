//! Client-side shopping cart.
//!
//! # Layers
//!
//! - [`storage`] - pluggable key-value persistence (file, memory, none)
//! - [`store`] - cart operations that read and write one storage key
//! - [`totals`] - subtotal, tax, shipping, and item count
//! - [`session`] - the live cart for the current session, keyed by
//!   authentication mode, with change notifications
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fakestore_storefront::cart::{AuthMode, CartSession, CartStore, MemoryStorage};
//!
//! let mut session = CartSession::new(CartStore::new(Arc::new(MemoryStorage::new())));
//! assert!(session.cart().is_none());
//!
//! session.activate(AuthMode::Guest);
//! assert_eq!(session.totals().map(|t| t.item_count), Some(0));
//! ```

pub mod session;
pub mod storage;
pub mod store;
pub mod totals;

pub use session::{
    AuthMode, CartEvent, CartSession, GUEST_CART_KEY, MergeOutcome, SubscriptionId, USER_CART_KEY,
};
pub use storage::{EphemeralStorage, FileStorage, MemoryStorage, Storage, StorageError};
pub use store::CartStore;
pub use totals::compute_totals;

use thiserror::Error;

/// Errors from the cart session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The session has not been activated yet.
    #[error("cart is not initialized")]
    NotInitialized,
}
