//! Guest cart persisted in the local key-value store.
//!
//! Lines are keyed by product: adding a product already in the cart bumps its
//! quantity instead of appending a second line.

use ayanavita_core::{CartItemError, GuestCartItem, NewCartItem, ProductId};

use crate::error::CartError;
use crate::storage::{KeyValueStore, StorageError, get_json, keys, set_json};

/// Guest cart lines stored under [`keys::GUEST_CART`].
#[derive(Debug, Clone)]
pub struct GuestCart<S> {
    store: S,
}

impl<S: KeyValueStore> GuestCart<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Read the stored lines. Missing or unreadable data is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself fails.
    pub fn load(&self) -> Result<Vec<GuestCartItem>, StorageError> {
        let mut lines: Vec<GuestCartItem> =
            get_json(&self.store, keys::GUEST_CART)?.unwrap_or_default();
        lines.retain(|line| line.quantity > 0);
        Ok(lines)
    }

    /// Replace the stored lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, lines: &[GuestCartItem]) -> Result<(), StorageError> {
        set_json(&self.store, keys::GUEST_CART, lines)
    }

    /// Delete the guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::GUEST_CART)
    }
}

/// Add a product, incrementing the existing line if there is one.
pub fn add_line(lines: &mut Vec<GuestCartItem>, item: NewCartItem) {
    if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.product_id) {
        line.quantity = line.quantity.saturating_add(item.quantity);
    } else {
        lines.push(GuestCartItem::from(item));
    }
}

/// Set a product's quantity. Zero or below removes the line.
///
/// # Errors
///
/// Returns [`CartError::LineNotFound`] if the product has no line, or
/// [`CartItemError::QuantityOutOfRange`] if the quantity does not fit.
pub fn set_quantity(
    lines: &mut Vec<GuestCartItem>,
    product_id: ProductId,
    quantity: i64,
) -> Result<(), CartError> {
    let pos = position(lines, product_id)?;
    if quantity <= 0 {
        lines.remove(pos);
        return Ok(());
    }

    let quantity =
        u32::try_from(quantity).map_err(|_| CartItemError::QuantityOutOfRange(quantity))?;
    if let Some(line) = lines.get_mut(pos) {
        line.quantity = quantity;
    }
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns [`CartError::LineNotFound`] if the product has no line.
pub fn remove_line(lines: &mut Vec<GuestCartItem>, product_id: ProductId) -> Result<(), CartError> {
    let pos = position(lines, product_id)?;
    lines.remove(pos);
    Ok(())
}

fn position(lines: &[GuestCartItem], product_id: ProductId) -> Result<usize, CartError> {
    lines
        .iter()
        .position(|l| l.product_id == product_id)
        .ok_or(CartError::LineNotFound(product_id))
}
