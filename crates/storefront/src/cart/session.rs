//! The live cart for the current session.
//!
//! [`CartSession`] owns the one cart instance the storefront shows, picks the
//! persistence key from the authentication mode, keeps the cart and its
//! totals in step, and notifies subscribers after every change.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --activate(Guest)---------> Initialized(Guest)
//! Uninitialized --activate(Authenticated)-> Initialized(Authenticated)   (merges guest cart)
//! Initialized(Guest) --activate(Authenticated)--> Initialized(Authenticated)   (merges guest cart)
//! ```
//!
//! Until [`CartSession::activate`] has run, the session exposes no cart and
//! every mutation returns [`CartError::NotInitialized`]. The guest cart is
//! merged into the user cart at most once per sign-in.

use fakestore_core::{Cart, CartItemId, CartTotals, Product};
use tracing::{debug, info, warn};

use super::CartError;
use super::storage::Storage;
use super::store::CartStore;
use super::totals::compute_totals;

/// Storage key of the cart kept while signed out.
pub const GUEST_CART_KEY: &str = "ecommerce_guest_cart";

/// Storage key of the cart kept while signed in.
pub const USER_CART_KEY: &str = "ecommerce_user_cart";

/// Whether the session belongs to a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Guest,
    Authenticated,
}

impl AuthMode {
    /// The persistence key for carts in this mode.
    #[must_use]
    pub const fn cart_key(self) -> &'static str {
        match self {
            Self::Guest => GUEST_CART_KEY,
            Self::Authenticated => USER_CART_KEY,
        }
    }
}

/// What a guest-to-user merge carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of guest cart lines folded in.
    pub lines: usize,
    /// Sum of their quantities.
    pub quantity: u64,
}

/// A change observed by subscribers.
#[derive(Debug, Clone, Copy)]
pub enum CartEvent<'a> {
    /// The cart or its totals changed (including initial activation).
    Updated {
        cart: &'a Cart,
        totals: &'a CartTotals,
    },
    /// Guest cart contents were added to the signed-in cart.
    GuestCartMerged(MergeOutcome),
    /// The cart drawer opened or closed.
    DrawerToggled(bool),
}

/// Handle returned by [`CartSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CartEvent<'_>) + Send>;

enum State {
    Uninitialized,
    Initialized {
        mode: AuthMode,
        cart: Cart,
        totals: CartTotals,
    },
}

/// The live cart, its totals, and the drawer flag for one session.
pub struct CartSession<S> {
    store: CartStore<S>,
    state: State,
    /// Set once the guest cart has been merged for the current sign-in.
    merged: bool,
    drawer_open: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: Storage> CartSession<S> {
    #[must_use]
    pub const fn new(store: CartStore<S>) -> Self {
        Self {
            store,
            state: State::Uninitialized,
            merged: false,
            drawer_open: false,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Load the cart for `mode`.
    ///
    /// On the first activation as [`AuthMode::Authenticated`] after a
    /// sign-in, a non-empty guest cart is merged into the user cart, the
    /// merged cart is saved under the user key, and the guest key is erased
    /// once that save succeeds.
    /// Activating again with the current mode does nothing. Switching back to
    /// [`AuthMode::Guest`] loads the guest cart without moving any items and
    /// arms the merge for the next sign-in.
    ///
    /// Returns what was merged, if anything.
    pub fn activate(&mut self, mode: AuthMode) -> Option<MergeOutcome> {
        if let State::Initialized { mode: current, .. } = &self.state
            && *current == mode
        {
            return None;
        }

        let mut cart = self.store.load(mode.cart_key());
        let mut outcome = None;

        match mode {
            AuthMode::Authenticated if !self.merged => {
                self.merged = true;
                let guest = self.store.load(GUEST_CART_KEY);
                if !guest.is_empty() {
                    let merged = MergeOutcome {
                        lines: guest.items.len(),
                        quantity: guest.items.iter().map(|item| u64::from(item.quantity)).sum(),
                    };
                    cart = self.store.combine(cart, guest);
                    // The guest cart is only erased once the merged cart is stored.
                    match self.store.try_save(&mut cart, USER_CART_KEY) {
                        Ok(()) => self.store.delete(GUEST_CART_KEY),
                        Err(e) => warn!(
                            error = %e,
                            "Failed to persist merged cart; keeping guest cart"
                        ),
                    }
                    info!(
                        lines = merged.lines,
                        quantity = merged.quantity,
                        "Merged guest cart into user cart"
                    );
                    outcome = Some(merged);
                }
            }
            AuthMode::Authenticated => {}
            AuthMode::Guest => self.merged = false,
        }

        let totals = compute_totals(&cart);
        debug!(key = mode.cart_key(), items = cart.items.len(), "Cart session activated");
        self.state = State::Initialized { mode, cart, totals };

        if let Some(merged) = outcome {
            self.emit(&CartEvent::GuestCartMerged(merged));
        }
        self.emit_updated();
        outcome
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized { .. })
    }

    /// The active mode, once initialized.
    #[must_use]
    pub const fn mode(&self) -> Option<AuthMode> {
        match &self.state {
            State::Initialized { mode, .. } => Some(*mode),
            State::Uninitialized => None,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The live cart, once initialized.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match &self.state {
            State::Initialized { cart, .. } => Some(cart),
            State::Uninitialized => None,
        }
    }

    /// Totals of the live cart, once initialized.
    #[must_use]
    pub const fn totals(&self) -> Option<&CartTotals> {
        match &self.state {
            State::Initialized { totals, .. } => Some(totals),
            State::Uninitialized => None,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.drawer_open
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of `product` and open the drawer.
    ///
    /// A zero quantity changes nothing and leaves the drawer as it was.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInitialized` before [`Self::activate`].
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> Result<&Cart, CartError> {
        if quantity == 0 {
            return self.cart().ok_or(CartError::NotInitialized);
        }
        self.mutate(|store, cart, key| store.add_item(cart, product, quantity, key))?;
        self.set_open(true);
        self.cart().ok_or(CartError::NotInitialized)
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInitialized` before [`Self::activate`].
    pub fn update_quantity(&mut self, item_id: CartItemId, quantity: i64) -> Result<&Cart, CartError> {
        self.mutate(|store, cart, key| store.set_item_quantity(cart, item_id, quantity, key))?;
        self.cart().ok_or(CartError::NotInitialized)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInitialized` before [`Self::activate`].
    pub fn remove_item(&mut self, item_id: CartItemId) -> Result<&Cart, CartError> {
        self.mutate(|store, cart, key| store.remove_item(cart, item_id, key))?;
        self.cart().ok_or(CartError::NotInitialized)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInitialized` before [`Self::activate`].
    pub fn clear_cart(&mut self) -> Result<&Cart, CartError> {
        self.mutate(|store, _cart, key| store.clear(key))?;
        self.cart().ok_or(CartError::NotInitialized)
    }

    /// Open or close the cart drawer. Never touches cart data.
    pub fn set_open(&mut self, open: bool) {
        if self.drawer_open != open {
            self.drawer_open = open;
            self.emit(&CartEvent::DrawerToggled(open));
        }
    }

    fn mutate(
        &mut self,
        op: impl FnOnce(&CartStore<S>, Cart, &'static str) -> Cart,
    ) -> Result<(), CartError> {
        let State::Initialized { mode, cart, totals } = &mut self.state else {
            return Err(CartError::NotInitialized);
        };

        let current = std::mem::take(cart);
        *cart = op(&self.store, current, mode.cart_key());
        *totals = compute_totals(cart);
        self.emit_updated();
        Ok(())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register `listener` for every subsequent [`CartEvent`].
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&CartEvent<'_>) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Stop notifying a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn emit_updated(&mut self) {
        if let State::Initialized { cart, totals, .. } = &self.state {
            let event = CartEvent::Updated { cart, totals };
            for (_, listener) in &mut self.listeners {
                listener(&event);
            }
        }
    }

    fn emit(&mut self, event: &CartEvent<'_>) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use fakestore_core::{ProductId, Rating};
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::storage::{MemoryStorage, StorageError};

    /// Memory storage that refuses writes to the user cart.
    struct UserCartReadOnly(Arc<MemoryStorage>);

    impl Storage for UserCartReadOnly {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            if key == USER_CART_KEY {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("quota exceeded"),
                });
            }
            self.0.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.0.delete(key)
        }
    }

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

    fn session(storage: &Arc<MemoryStorage>) -> CartSession<Arc<MemoryStorage>> {
        CartSession::new(CartStore::new(storage.clone()))
    }

    fn quantities(cart: &Cart) -> Vec<(i64, u32)> {
        cart.items
            .iter()
            .map(|item| (item.product.id.as_i64(), item.quantity))
            .collect()
    }

    #[test]
    fn test_uninitialized_exposes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);

        assert!(!session.is_initialized());
        assert!(session.cart().is_none());
        assert!(session.totals().is_none());
        assert!(matches!(
            session.add_to_cart(&product(1, 100), 1),
            Err(CartError::NotInitialized)
        ));
        assert!(matches!(session.clear_cart(), Err(CartError::NotInitialized)));
        assert!(!session.is_open());
    }

    #[test]
    fn test_guest_session_uses_guest_key() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        assert_eq!(session.activate(AuthMode::Guest), None);

        session.add_to_cart(&product(1, 2500), 2).unwrap();
        assert!(storage.get(GUEST_CART_KEY).unwrap().is_some());
        assert!(storage.get(USER_CART_KEY).unwrap().is_none());

        let totals = session.totals().unwrap();
        assert_eq!(totals.subtotal, Decimal::from(50));
        assert_eq!(totals.total, Decimal::from(64));
    }

    #[test]
    fn test_add_opens_drawer() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Guest);
        assert!(!session.is_open());
        session.add_to_cart(&product(1, 100), 1).unwrap();
        assert!(session.is_open());
        session.set_open(false);
        assert!(!session.is_open());
        assert_eq!(session.cart().unwrap().items.len(), 1);
    }

    #[test]
    fn test_totals_track_every_mutation() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Guest);

        session.add_to_cart(&product(1, 1000), 1).unwrap();
        let id = session.cart().unwrap().items[0].id;
        session.update_quantity(id, 4).unwrap();
        assert_eq!(session.totals().unwrap().item_count, 4);
        assert_eq!(session.totals().unwrap().subtotal, Decimal::from(40));

        session.remove_item(id).unwrap();
        assert_eq!(session.totals().unwrap().item_count, 0);
    }

    #[test]
    fn test_clear_resets() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Guest);
        session.add_to_cart(&product(1, 1000), 3).unwrap();

        let cart = session.clear_cart().unwrap();
        assert!(cart.is_empty());
        assert_eq!(session.totals().unwrap().item_count, 0);

        let mut reloaded = self::session(&storage);
        reloaded.activate(AuthMode::Guest);
        assert!(reloaded.cart().unwrap().is_empty());
    }

    #[test]
    fn test_login_merges_guest_cart_once() {
        let storage = Arc::new(MemoryStorage::new());

        // A previous signed-in visit left A×1, B×3 in the user cart.
        let mut earlier = session(&storage);
        earlier.activate(AuthMode::Authenticated);
        earlier.add_to_cart(&product(1, 100), 1).unwrap();
        earlier.add_to_cart(&product(2, 100), 3).unwrap();

        let mut session = session(&storage);
        session.activate(AuthMode::Guest);
        session.add_to_cart(&product(1, 100), 2).unwrap();

        let outcome = session.activate(AuthMode::Authenticated);
        assert_eq!(
            outcome,
            Some(MergeOutcome {
                lines: 1,
                quantity: 2
            })
        );
        assert_eq!(quantities(session.cart().unwrap()), vec![(1, 3), (2, 3)]);
        assert!(storage.get(GUEST_CART_KEY).unwrap().is_none());

        // Activating again in the same mode does not merge twice.
        assert_eq!(session.activate(AuthMode::Authenticated), None);
        assert_eq!(quantities(session.cart().unwrap()), vec![(1, 3), (2, 3)]);

        // The merged cart was persisted under the user key.
        let mut reloaded = self::session(&storage);
        reloaded.activate(AuthMode::Authenticated);
        assert_eq!(quantities(reloaded.cart().unwrap()), vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn test_initial_authenticated_activation_merges() {
        let storage = Arc::new(MemoryStorage::new());
        let mut guest = session(&storage);
        guest.activate(AuthMode::Guest);
        guest.add_to_cart(&product(9, 100), 1).unwrap();

        let mut session = session(&storage);
        let outcome = session.activate(AuthMode::Authenticated);
        assert_eq!(outcome.map(|o| o.lines), Some(1));
        assert_eq!(quantities(session.cart().unwrap()), vec![(9, 1)]);
    }

    #[test]
    fn test_empty_guest_cart_does_not_notify() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        let merges = Arc::new(Mutex::new(0));
        let seen = merges.clone();
        session.subscribe(move |event| {
            if matches!(event, CartEvent::GuestCartMerged(_)) {
                *seen.lock().unwrap() += 1;
            }
        });

        session.activate(AuthMode::Guest);
        assert_eq!(session.activate(AuthMode::Authenticated), None);
        assert_eq!(*merges.lock().unwrap(), 0);
    }

    #[test]
    fn test_logout_then_login_merges_again() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Authenticated);
        session.add_to_cart(&product(1, 100), 1).unwrap();

        session.activate(AuthMode::Guest);
        assert!(session.cart().unwrap().is_empty());
        session.add_to_cart(&product(1, 100), 4).unwrap();

        let outcome = session.activate(AuthMode::Authenticated);
        assert_eq!(outcome.map(|o| o.quantity), Some(4));
        assert_eq!(quantities(session.cart().unwrap()), vec![(1, 5)]);
    }

    #[test]
    fn test_subscribers_see_consistent_pairs() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        let seen: Arc<Mutex<Vec<(usize, u64)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = session.subscribe(move |event| {
            if let CartEvent::Updated { cart, totals } = event {
                let count: u64 = cart.items.iter().map(|i| u64::from(i.quantity)).sum();
                assert_eq!(count, totals.item_count);
                sink.lock().unwrap().push((cart.items.len(), totals.item_count));
            }
        });

        session.activate(AuthMode::Guest);
        session.add_to_cart(&product(1, 100), 2).unwrap();
        session.add_to_cart(&product(2, 100), 1).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(0, 0), (1, 2), (2, 3)]);

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.clear_cart().unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_drawer_events() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let sink = toggles.clone();
        session.subscribe(move |event| {
            if let CartEvent::DrawerToggled(open) = event {
                sink.lock().unwrap().push(*open);
            }
        });

        session.activate(AuthMode::Guest);
        session.add_to_cart(&product(1, 100), 1).unwrap();
        // Already open: no second event.
        session.add_to_cart(&product(1, 100), 1).unwrap();
        session.set_open(false);
        assert_eq!(*toggles.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_unknown_item_mutations_are_noops() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Guest);
        session.add_to_cart(&product(1, 100), 2).unwrap();
        let before = session.cart().unwrap().clone();

        let after = session.remove_item(CartItemId::new(9999)).unwrap();
        assert!(after.same_items(&before));
        let after = session.update_quantity(CartItemId::new(9999), 3).unwrap();
        assert!(after.same_items(&before));
    }

    #[test]
    fn test_failed_merge_save_keeps_guest_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut guest = session(&storage);
        guest.activate(AuthMode::Guest);
        guest.add_to_cart(&product(1, 1000), 2).unwrap();

        let mut user = CartSession::new(CartStore::new(UserCartReadOnly(storage.clone())));
        let outcome = user.activate(AuthMode::Authenticated);
        assert_eq!(outcome.map(|merged| merged.quantity), Some(2));
        assert_eq!(quantities(user.cart().unwrap()), vec![(1, 2)]);

        assert!(storage.get(GUEST_CART_KEY).unwrap().is_some());
        assert!(storage.get(USER_CART_KEY).unwrap().is_none());

        // A later sign-in with working storage still finds the guest items
        let mut retry = session(&storage);
        retry.activate(AuthMode::Authenticated);
        assert_eq!(quantities(retry.cart().unwrap()), vec![(1, 2)]);
        assert!(storage.get(GUEST_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_add_zero_leaves_drawer_closed() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = session(&storage);
        session.activate(AuthMode::Guest);

        let updates = Arc::new(Mutex::new(0));
        let sink = updates.clone();
        session.subscribe(move |_| *sink.lock().unwrap() += 1);

        assert!(session.add_to_cart(&product(1, 100), 0).unwrap().is_empty());
        assert!(!session.is_open());
        assert_eq!(*updates.lock().unwrap(), 0);
        assert!(storage.get(GUEST_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_huge_quantity_does_not_break_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut expensive = product(1, 100);
        expensive.price = Decimal::from_i128_with_scale(20_000_000_000_000_000_000, 0);

        let mut session = session(&storage);
        session.activate(AuthMode::Guest);
        session.add_to_cart(&expensive, 1).unwrap();
        let id = session.cart().unwrap().items[0].id;
        session.update_quantity(id, i64::MAX).unwrap();

        let totals = session.totals().unwrap();
        assert_eq!(totals.item_count, u64::from(u32::MAX));
        assert_eq!(totals.total, Decimal::MAX);

        let mut reopened = CartSession::new(CartStore::new(storage.clone()));
        reopened.activate(AuthMode::Guest);
        assert_eq!(reopened.totals().unwrap().subtotal, Decimal::MAX);
    }
}
