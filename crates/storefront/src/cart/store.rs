//! Storage-backed cart operations.
//!
//! Every operation takes the cart by value, returns the updated cart, and
//! writes it back under the given key. None of them fail: storage and parse
//! problems are logged and the operation degrades to "no cart stored" or
//! "not persisted".

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use fakestore_core::{Cart, CartItem, CartItemId, Product};
use tracing::{debug, error, warn};

use super::storage::{Storage, StorageError};

/// Cart operations over one storage backend.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    ids: ItemIdGenerator,
}

impl<S: Storage> CartStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            ids: ItemIdGenerator::default(),
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the cart stored at `key`.
    ///
    /// Returns a fresh empty cart when nothing is stored, the backend cannot
    /// be read, or the stored value is malformed. Lines with a zero quantity
    /// are dropped.
    pub fn load(&self, key: &str) -> Cart {
        let bytes = match self.storage.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Cart::empty(),
            Err(e) => {
                error!(error = %e, key, "Failed to read stored cart");
                return Cart::empty();
            }
        };

        match serde_json::from_slice::<Cart>(&bytes) {
            Ok(mut cart) => {
                let before = cart.items.len();
                cart.items.retain(|item| item.quantity > 0);
                if cart.items.len() != before {
                    warn!(
                        key,
                        dropped = before - cart.items.len(),
                        "Dropped zero-quantity cart lines"
                    );
                }
                cart
            }
            Err(e) => {
                warn!(error = %e, key, "Stored cart is malformed; starting empty");
                Cart::empty()
            }
        }
    }

    /// Stamp `last_updated` and write the cart to `key`, logging failures.
    ///
    /// Does nothing when the backend is not persistent.
    pub fn save(&self, cart: &mut Cart, key: &str) {
        if let Err(e) = self.try_save(cart, key) {
            error!(error = %e, key, "Failed to persist cart");
        }
    }

    /// Like [`Self::save`], but reports whether the write happened.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    pub fn try_save(&self, cart: &mut Cart, key: &str) -> Result<(), StorageError> {
        if !self.storage.is_persistent() {
            return Ok(());
        }

        cart.last_updated = Utc::now();
        let bytes = serde_json::to_vec(cart).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            source: e,
        })?;
        self.storage.set(key, &bytes)
    }

    /// Erase whatever is stored at `key`.
    pub fn delete(&self, key: &str) {
        if let Err(e) = self.storage.delete(key) {
            error!(error = %e, key, "Failed to delete stored cart");
        }
    }

    /// Add `quantity` of `product`.
    ///
    /// If a line for the same product exists its quantity grows; otherwise a
    /// new line holding a snapshot of `product` is appended. A zero quantity
    /// leaves the cart untouched.
    pub fn add_item(&self, mut cart: Cart, product: &Product, quantity: u32, key: &str) -> Cart {
        if quantity == 0 {
            warn!(product_id = %product.id, "Ignoring add of zero quantity");
            return cart;
        }

        if let Some(item) = cart
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            item.quantity = item.quantity.saturating_add(quantity);
            debug!(product_id = %product.id, quantity = item.quantity, "Increased cart line");
        } else {
            let id = self.ids.next(&cart);
            cart.items.push(CartItem {
                id,
                product: product.clone(),
                quantity,
            });
            debug!(product_id = %product.id, item_id = %id, quantity, "Added cart line");
        }

        self.save(&mut cart, key);
        cart
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// An unknown `item_id` is logged and the cart is returned unchanged.
    pub fn set_item_quantity(
        &self,
        mut cart: Cart,
        item_id: CartItemId,
        quantity: i64,
        key: &str,
    ) -> Cart {
        let Some(index) = cart.items.iter().position(|item| item.id == item_id) else {
            warn!(item_id = %item_id, "Cart item not found");
            return cart;
        };

        if quantity <= 0 {
            cart.items.remove(index);
            debug!(item_id = %item_id, "Removed cart line");
        } else if let Some(item) = cart.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            debug!(item_id = %item_id, quantity = item.quantity, "Set cart line quantity");
        }

        self.save(&mut cart, key);
        cart
    }

    /// Remove a line. An unknown `item_id` leaves the cart unchanged.
    pub fn remove_item(&self, mut cart: Cart, item_id: CartItemId, key: &str) -> Cart {
        let before = cart.items.len();
        cart.items.retain(|item| item.id != item_id);
        if cart.items.len() == before {
            warn!(item_id = %item_id, "Cart item not found");
            return cart;
        }

        debug!(item_id = %item_id, "Removed cart line");
        self.save(&mut cart, key);
        cart
    }

    /// Replace the cart at `key` with an empty one and return it.
    pub fn clear(&self, key: &str) -> Cart {
        let mut cart = Cart::empty();
        self.save(&mut cart, key);
        cart
    }

    /// Fold `source` lines into `target` and persist the result at `key`.
    pub fn merge(&self, target: Cart, source: Cart, key: &str) -> Cart {
        let mut merged = self.combine(target, source);
        self.save(&mut merged, key);
        merged
    }

    /// Fold `source` lines into `target` without writing anything.
    ///
    /// Lines for a product already in `target` add their quantity to it;
    /// other lines are appended in order. Appended lines keep their ID unless
    /// it is already taken in `target`.
    #[must_use]
    pub fn combine(&self, mut target: Cart, source: Cart) -> Cart {
        for incoming in source.items {
            if let Some(existing) = target
                .items
                .iter_mut()
                .find(|item| item.product.id == incoming.product.id)
            {
                existing.quantity = existing.quantity.saturating_add(incoming.quantity);
            } else {
                let id = if target.item(incoming.id).is_some() {
                    self.ids.next(&target)
                } else {
                    incoming.id
                };
                target.items.push(CartItem { id, ..incoming });
            }
        }
        target
    }
}

// =============================================================================
// Item IDs
// =============================================================================

/// Issues cart line IDs from the millisecond clock.
///
/// Each ID is greater than the previous one issued and than every ID already
/// in the cart, so two lines never share an ID even within one millisecond
/// or after the clock steps back.
#[derive(Debug, Default)]
struct ItemIdGenerator {
    last: AtomicI64,
}

impl ItemIdGenerator {
    fn next(&self, cart: &Cart) -> CartItemId {
        let now = Utc::now().timestamp_millis();
        let cart_max = cart
            .items
            .iter()
            .map(|item| item.id.as_i64())
            .max()
            .unwrap_or(0);

        let next = |last: i64| now.max(last.saturating_add(1)).max(cart_max.saturating_add(1));
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
            .map_or_else(|last| last, |last| last);
        CartItemId::new(next(previous))
    }
}
