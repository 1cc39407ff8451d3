//! Guest/server cart reconciliation.
//!
//! [`CartReconciler`] decides, per operation, whether the backend or the
//! local guest cart is the source of truth:
//!
//! - Signed in and [`CartMode::ServerBacked`]: the backend cart is used.
//! - Otherwise: the guest cart in local storage is used.
//!
//! Any server failure latches the reconciler into [`CartMode::LocalFallback`]
//! for the rest of its lifetime and the operation is retried against local
//! storage, so callers never see server errors. Building a new reconciler
//! (next page load / process start) is the only way back to the server.
//!
//! Mutations take `&mut self`: one operation finishes, response applied,
//! before the next can start, so a slow response can never overwrite a newer
//! one.

use ayanavita_core::{
    CartItem, CartItemError, CartItemId, CartMode, CartState, GuestCartItem, MergeLine,
    NewCartItem, ProductId,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::guest::{self, GuestCart};
use crate::api::{ApiError, CartApi};
use crate::error::{CartError, Result, cart_breadcrumb};
use crate::storage::{KeyValueStore, StorageError};

/// Why the sign-in merge did not complete.
#[derive(Debug, Error)]
enum MergeFailure {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Unified cart over the backend and the guest cart.
#[derive(Debug)]
pub struct CartReconciler<A, S> {
    api: A,
    guest: GuestCart<S>,
    mode: CartMode,
    authenticated: bool,
    state: CartState,
    revision: u64,
}

impl<A: CartApi, S: KeyValueStore> CartReconciler<A, S> {
    /// Create a reconciler with an empty cart.
    ///
    /// Call [`refresh`](Self::refresh) to load the initial cart.
    pub fn new(api: A, store: S, authenticated: bool) -> Self {
        Self {
            api,
            guest: GuestCart::new(store),
            mode: CartMode::ServerBacked,
            authenticated,
            state: CartState::empty(),
            revision: 0,
        }
    }

    /// Current cart.
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    pub const fn mode(&self) -> CartMode {
        self.mode
    }

    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Incremented every time a new cart state is applied.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the next operation will go to the backend.
    pub const fn server_usable(&self) -> bool {
        self.authenticated && self.mode.allows_server()
    }

    /// The guest cart backing local operations.
    pub const fn guest(&self) -> &GuestCart<S> {
        &self.guest
    }

    /// Reload the cart from its current source of truth.
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails.
    #[instrument(skip(self), fields(mode = %self.mode, authenticated = self.authenticated))]
    pub async fn refresh(&mut self) -> Result<&CartState> {
        if self.server_usable() {
            match self.api.fetch_cart().await {
                Ok(cart) => {
                    self.apply(cart);
                    return Ok(&self.state);
                }
                Err(e) => self.fall_back("fetch_cart", &e),
            }
        }

        self.load_guest()?;
        Ok(&self.state)
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or local storage fails.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub async fn add_item(&mut self, item: NewCartItem) -> Result<&CartState> {
        item.validate()?;

        if self.server_usable() {
            match self.api.add_item(&item).await {
                Ok(cart) => {
                    self.apply(cart);
                    return Ok(&self.state);
                }
                Err(e) => self.fall_back("add_item", &e),
            }
        }

        let mut lines = self.guest.load()?;
        guest::add_line(&mut lines, item);
        self.save_guest(&lines)?;
        Ok(&self.state)
    }

    /// Set a product's quantity. Zero or below removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is out of range, local storage fails,
    /// or the product is not in the cart while the server is still in use or
    /// the customer is a guest. In local fallback a missing product is a no-op.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<&CartState> {
        if self.server_usable() {
            let item_id = self.server_line(product_id)?;
            if let Some(item_id) = item_id {
                let result = if quantity <= 0 {
                    self.api.remove_item(item_id).await
                } else {
                    let quantity = u32::try_from(quantity)
                        .map_err(|_| CartItemError::QuantityOutOfRange(quantity))?;
                    self.api.update_item(item_id, quantity).await
                };
                match result {
                    Ok(cart) => {
                        self.apply(cart);
                        return Ok(&self.state);
                    }
                    Err(e) => self.fall_back("update_item", &e),
                }
            }
        }

        self.edit_guest(|lines| guest::set_quantity(lines, product_id, quantity))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails, or if the product is not in the
    /// cart outside local fallback.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn remove_item(&mut self, product_id: ProductId) -> Result<&CartState> {
        if self.server_usable()
            && let Some(item_id) = self.server_line(product_id)?
        {
            match self.api.remove_item(item_id).await {
                Ok(cart) => {
                    self.apply(cart);
                    return Ok(&self.state);
                }
                Err(e) => self.fall_back("remove_item", &e),
            }
        }

        self.edit_guest(|lines| guest::remove_line(lines, product_id))
    }

    /// React to a sign-in state change.
    ///
    /// On sign-in with the server usable, the guest cart is merged into the
    /// server cart with one call, guest storage is cleared and the server
    /// cart is reloaded. If any of those steps fails the reconciler falls
    /// back to local storage for the rest of its lifetime. On sign-out the
    /// guest cart becomes the cart again. Unchanged state is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails while loading the guest cart.
    #[instrument(skip(self), fields(mode = %self.mode, was = self.authenticated))]
    pub async fn set_authenticated(&mut self, authenticated: bool) -> Result<&CartState> {
        if self.authenticated == authenticated {
            return Ok(&self.state);
        }
        self.authenticated = authenticated;

        if !authenticated {
            info!("Signed out, switching to guest cart");
            self.load_guest()?;
            return Ok(&self.state);
        }

        if !self.mode.allows_server() {
            debug!("Signed in while server cart is unavailable, keeping guest cart");
            self.load_guest()?;
            return Ok(&self.state);
        }

        match self.merge_guest_cart().await {
            Ok(cart) => self.apply(cart),
            Err(e) => {
                warn!(error = %e, "Sign-in cart merge failed");
                self.mode = CartMode::LocalFallback;
                cart_breadcrumb(self.mode, "Sign-in merge failed, using local cart", &[]);
                self.load_guest()?;
            }
        }
        Ok(&self.state)
    }

    /// Merge guest lines into the server cart, clear them, and reload.
    async fn merge_guest_cart(&self) -> std::result::Result<CartState, MergeFailure> {
        let lines = self.guest.load()?;
        if !lines.is_empty() {
            let merge: Vec<MergeLine> = lines.iter().map(MergeLine::from).collect();
            self.api.merge_items(&merge).await?;
            self.guest.clear()?;

            info!(lines = merge.len(), "Merged guest cart into server cart");
            let count = merge.len().to_string();
            cart_breadcrumb(self.mode, "Merged guest cart", &[("lines", count.as_str())]);
        }
        Ok(self.api.fetch_cart().await?)
    }

    /// Server line ID for a product in the current server cart.
    ///
    /// `Ok(None)` means the line is a guest line and must be handled locally.
    fn server_line(&self, product_id: ProductId) -> Result<Option<CartItemId>> {
        self.state
            .find(product_id)
            .map(|line: &CartItem| line.item_id)
            .ok_or(CartError::LineNotFound(product_id))
    }

    /// Latch into local fallback after a server failure.
    fn fall_back(&mut self, operation: &'static str, error: &ApiError) {
        warn!(
            operation,
            error = %error,
            "Server cart unavailable, using local storage for the rest of this session"
        );
        self.mode = CartMode::LocalFallback;
        cart_breadcrumb(self.mode, "Switched to local cart", &[("operation", operation)]);
    }

    /// Apply `edit` to the guest lines and save them.
    ///
    /// In local fallback the displayed lines may have come from the server, so
    /// a product missing from the guest cart leaves it unchanged and shows it.
    fn edit_guest(
        &mut self,
        edit: impl FnOnce(&mut Vec<GuestCartItem>) -> Result<()>,
    ) -> Result<&CartState> {
        let mut lines = self.guest.load()?;
        match edit(&mut lines) {
            Ok(()) => self.save_guest(&lines)?,
            Err(CartError::LineNotFound(product_id)) if !self.mode.allows_server() => {
                debug!(%product_id, "Product not in local cart, nothing to change");
                self.apply(CartState::from_guest(&lines));
            }
            Err(e) => return Err(e),
        }
        Ok(&self.state)
    }

    fn load_guest(&mut self) -> std::result::Result<(), StorageError> {
        let lines = self.guest.load()?;
        self.apply(CartState::from_guest(&lines));
        Ok(())
    }

    fn save_guest(&mut self, lines: &[GuestCartItem]) -> std::result::Result<(), StorageError> {
        self.guest.save(lines)?;
        self.apply(CartState::from_guest(lines));
        Ok(())
    }

    fn apply(&mut self, state: CartState) {
        self.state = state;
        self.revision += 1;
        debug!(
            revision = self.revision,
            total_items = self.state.total_items(),
            subtotal = %self.state.subtotal(),
            "Cart updated"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ayanavita_core::{CartId, Price};

    use super::*;
    use crate::storage::{MemoryStore, get_json, keys};

    // =========================================================================
    // Scripted CartApi
    // =========================================================================

    /// Replays queued responses and counts calls.
    #[derive(Default)]
    struct ScriptedApi {
        responses: Mutex<VecDeque<std::result::Result<CartState, u16>>>,
        calls: AtomicUsize,
        merged: Mutex<Vec<Vec<MergeLine>>>,
    }

    impl ScriptedApi {
        fn push_ok(&self, state: CartState) {
            self.responses.lock().unwrap().push_back(Ok(state));
        }

        fn push_err(&self, status: u16) {
            self.responses.lock().unwrap().push_back(Err(status));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> std::result::Result<CartState, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(state)) => Ok(state),
                Some(Err(status)) => Err(ApiError::Status {
                    status,
                    body: "scripted failure".to_string(),
                }),
                None => Err(ApiError::Status {
                    status: 599,
                    body: "no scripted response".to_string(),
                }),
            }
        }
    }

    impl CartApi for &ScriptedApi {
        async fn fetch_cart(&self) -> std::result::Result<CartState, ApiError> {
            self.next()
        }

        async fn add_item(&self, _item: &NewCartItem) -> std::result::Result<CartState, ApiError> {
            self.next()
        }

        async fn update_item(
            &self,
            _item_id: CartItemId,
            _quantity: u32,
        ) -> std::result::Result<CartState, ApiError> {
            self.next()
        }

        async fn remove_item(&self, _item_id: CartItemId) -> std::result::Result<CartState, ApiError> {
            self.next()
        }

        async fn merge_items(&self, lines: &[MergeLine]) -> std::result::Result<CartState, ApiError> {
            self.merged.lock().unwrap().push(lines.to_vec());
            self.next()
        }
    }

    fn new_item(product: i64, price: u64, quantity: u32) -> NewCartItem {
        NewCartItem::new(
            ProductId::new(product),
            format!("Product {product}"),
            Price::from_dong(price),
            quantity,
        )
    }

    fn server_cart(lines: &[(i64, i64, u64, u32)]) -> CartState {
        let items = lines
            .iter()
            .map(|&(item_id, product, price, quantity)| CartItem {
                item_id: Some(CartItemId::new(item_id)),
                product_id: ProductId::new(product),
                name: format!("Product {product}"),
                price: Price::from_dong(price),
                quantity,
                image: None,
            })
            .collect();
        CartState::new(Some(CartId::new(1)), items)
    }

    fn stored_quantity(store: &MemoryStore) -> u64 {
        let lines: Vec<GuestCartItem> = get_json(store, keys::GUEST_CART).unwrap().unwrap_or_default();
        lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    // =========================================================================
    // Guest mode
    // =========================================================================

    #[tokio::test]
    async fn test_guest_scenario_totals() {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);
        cart.refresh().await.unwrap();

        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        let state = cart.add_item(new_item(102, 30_000, 1)).await.unwrap();

        assert_eq!(state.subtotal(), Price::from_dong(130_000));
        assert_eq!(state.total_items(), 3);
        assert!(state.cart_id().is_none());
        assert_eq!(api.calls(), 0, "guest operations must not hit the server");
    }

    #[tokio::test]
    async fn test_guest_total_matches_storage_after_every_operation() {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);

        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        assert_eq!(cart.state().total_items(), stored_quantity(&store));

        cart.add_item(new_item(101, 50_000, 1)).await.unwrap();
        assert_eq!(cart.state().total_items(), 3);
        assert_eq!(cart.state().total_items(), stored_quantity(&store));

        cart.add_item(new_item(102, 30_000, 4)).await.unwrap();
        assert_eq!(cart.state().total_items(), stored_quantity(&store));

        cart.update_quantity(ProductId::new(102), 2).await.unwrap();
        assert_eq!(cart.state().total_items(), 5);
        assert_eq!(cart.state().total_items(), stored_quantity(&store));

        cart.remove_item(ProductId::new(101)).await.unwrap();
        assert_eq!(cart.state().total_items(), 2);
        assert_eq!(cart.state().total_items(), stored_quantity(&store));
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_from_state_and_storage() {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);
        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        cart.add_item(new_item(102, 30_000, 1)).await.unwrap();

        let state = cart.update_quantity(ProductId::new(101), 0).await.unwrap();
        assert!(state.find(ProductId::new(101)).is_none());

        cart.update_quantity(ProductId::new(102), -1).await.unwrap();
        assert!(cart.state().is_empty());
        assert!(cart.guest().load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_without_side_effects() {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);

        let err = cart.add_item(new_item(101, 50_000, 0)).await.unwrap_err();
        assert!(matches!(err, CartError::Invalid(_)));
        assert!(store.is_empty());

        let err = cart.update_quantity(ProductId::new(5), 1).await.unwrap_err();
        assert!(matches!(err, CartError::LineNotFound(_)));
    }

    // =========================================================================
    // Server mode
    // =========================================================================

    #[tokio::test]
    async fn test_server_operations_replace_state() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[]));
        api.push_ok(server_cart(&[(1, 101, 50_000, 2)]));
        api.push_ok(server_cart(&[(1, 101, 50_000, 5)]));
        api.push_ok(server_cart(&[]));

        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), true);
        cart.refresh().await.unwrap();

        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        assert_eq!(cart.state().find(ProductId::new(101)).unwrap().item_id, Some(CartItemId::new(1)));

        cart.update_quantity(ProductId::new(101), 5).await.unwrap();
        assert_eq!(cart.state().total_items(), 5);

        cart.remove_item(ProductId::new(101)).await.unwrap();
        assert!(cart.state().is_empty());

        assert_eq!(api.calls(), 4);
        assert_eq!(cart.mode(), CartMode::ServerBacked);
        assert!(store.is_empty(), "server mode must not touch guest storage");
    }

    #[tokio::test]
    async fn test_server_update_to_zero_sends_remove() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[(1, 101, 50_000, 2)]));
        api.push_ok(server_cart(&[]));

        let mut cart = CartReconciler::new(&api, MemoryStore::new(), true);
        cart.refresh().await.unwrap();
        let state = cart.update_quantity(ProductId::new(101), 0).await.unwrap();
        assert!(state.is_empty());
        assert_eq!(cart.mode(), CartMode::ServerBacked);
    }

    #[tokio::test]
    async fn test_server_failure_latches_local_fallback() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[]));
        api.push_err(503);

        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), true);
        cart.refresh().await.unwrap();

        // Server add fails; the item lands in local storage instead.
        let state = cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        assert_eq!(state.total_items(), 2);
        assert_eq!(cart.mode(), CartMode::LocalFallback);
        assert_eq!(stored_quantity(&store), 2);
        assert_eq!(api.calls(), 2);

        // A queued failure would be consumed if the server were retried.
        api.push_err(500);
        cart.add_item(new_item(102, 30_000, 1)).await.unwrap();
        cart.update_quantity(ProductId::new(101), 1).await.unwrap();
        cart.refresh().await.unwrap();

        assert_eq!(api.calls(), 2, "server must not be retried after fallback");
        assert_eq!(cart.mode(), CartMode::LocalFallback);
        assert_eq!(cart.state().total_items(), stored_quantity(&store));
        assert!(!cart.server_usable());
    }

    #[tokio::test]
    async fn test_server_line_edits_after_failure_do_not_error() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[(1, 101, 50_000, 2)]));
        api.push_err(503);

        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), true);
        cart.refresh().await.unwrap();
        assert_eq!(cart.state().total_items(), 2);

        // The line only exists on the server; the failed update shows the local cart.
        let state = cart.update_quantity(ProductId::new(101), 5).await.unwrap();
        assert!(state.is_empty());
        assert!(state.cart_id().is_none());
        assert_eq!(cart.mode(), CartMode::LocalFallback);

        let state = cart.remove_item(ProductId::new(101)).await.unwrap();
        assert!(state.is_empty());
        let state = cart.update_quantity(ProductId::new(101), 0).await.unwrap();
        assert!(state.is_empty());

        assert_eq!(api.calls(), 2);
        assert_eq!(stored_quantity(&store), 0);
    }

    #[tokio::test]
    async fn test_missing_guest_line_still_errors_for_guests() {
        let api = ScriptedApi::default();
        let mut cart = CartReconciler::new(&api, MemoryStore::new(), false);

        let err = cart.remove_item(ProductId::new(7)).await.unwrap_err();
        assert!(matches!(err, CartError::LineNotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_failure_falls_back_to_storage() {
        let api = ScriptedApi::default();
        api.push_err(502);

        let store = MemoryStore::new();
        let mut guest = Vec::new();
        guest::add_line(&mut guest, new_item(101, 50_000, 2));
        GuestCart::new(store.clone()).save(&guest).unwrap();

        let mut cart = CartReconciler::new(&api, store, true);
        let state = cart.refresh().await.unwrap();
        assert_eq!(state.total_items(), 2);
        assert!(state.cart_id().is_none());
        assert_eq!(cart.mode(), CartMode::LocalFallback);
    }

    // =========================================================================
    // Sign-in transition
    // =========================================================================

    #[tokio::test]
    async fn test_sign_in_merges_guest_cart() {
        let api = ScriptedApi::default();
        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);
        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();
        cart.add_item(new_item(102, 30_000, 1)).await.unwrap();

        let merged = server_cart(&[(10, 101, 50_000, 2), (11, 102, 30_000, 1), (12, 900, 10_000, 1)]);
        api.push_ok(merged.clone()); // merge response
        api.push_ok(merged.clone()); // reload

        let state = cart.set_authenticated(true).await.unwrap();
        assert_eq!(*state, merged);
        assert!(store.get(keys::GUEST_CART).unwrap().is_none());
        assert_eq!(cart.mode(), CartMode::ServerBacked);

        let calls = api.merged.lock().unwrap();
        assert_eq!(calls.len(), 1, "exactly one merge call");
        assert_eq!(
            calls[0],
            vec![
                MergeLine { product_id: ProductId::new(101), quantity: 2 },
                MergeLine { product_id: ProductId::new(102), quantity: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_sign_in_with_empty_guest_cart_skips_merge() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[(1, 300, 20_000, 1)]));

        let mut cart = CartReconciler::new(&api, MemoryStore::new(), false);
        let state = cart.set_authenticated(true).await.unwrap();

        assert_eq!(state.total_items(), 1);
        assert!(api.merged.lock().unwrap().is_empty());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_merge_failure_keeps_guest_cart() {
        let api = ScriptedApi::default();
        api.push_err(500);

        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);
        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();

        let state = cart.set_authenticated(true).await.unwrap();
        assert_eq!(state.total_items(), 2);
        assert_eq!(cart.mode(), CartMode::LocalFallback);
        assert_eq!(stored_quantity(&store), 2, "guest cart kept after failed merge");

        // Later operations stay local and do not throw.
        cart.add_item(new_item(102, 30_000, 1)).await.unwrap();
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_reload_failure_falls_back() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[(10, 101, 50_000, 2)]));
        api.push_err(503);

        let store = MemoryStore::new();
        let mut cart = CartReconciler::new(&api, store.clone(), false);
        cart.add_item(new_item(101, 50_000, 2)).await.unwrap();

        cart.set_authenticated(true).await.unwrap();
        assert_eq!(cart.mode(), CartMode::LocalFallback);
        // The merge succeeded, so the guest cart was already cleared.
        assert!(cart.state().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_guest_cart() {
        let api = ScriptedApi::default();
        api.push_ok(server_cart(&[(1, 101, 50_000, 2)]));

        let mut cart = CartReconciler::new(&api, MemoryStore::new(), true);
        cart.refresh().await.unwrap();
        assert_eq!(cart.state().total_items(), 2);

        let state = cart.set_authenticated(false).await.unwrap();
        assert!(state.is_empty());
        assert!(!cart.is_authenticated());
    }

    #[tokio::test]
    async fn test_unchanged_authentication_is_noop() {
        let api = ScriptedApi::default();
        let mut cart = CartReconciler::new(&api, MemoryStore::new(), false);
        let before = cart.revision();
        cart.set_authenticated(false).await.unwrap();
        assert_eq!(cart.revision(), before);
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_revision_increments_per_applied_state() {
        let api = ScriptedApi::default();
        let mut cart = CartReconciler::new(&api, MemoryStore::new(), false);
        assert_eq!(cart.revision(), 0);
        cart.refresh().await.unwrap();
        cart.add_item(new_item(1, 1_000, 1)).await.unwrap();
        assert_eq!(cart.revision(), 2);
    }
}
