//! Cart data model shared by the guest (local storage) and server carts.
//!
//! [`CartState`] never stores its derived totals independently: the only ways
//! to build one recompute `subtotal` and `total_items` from the line items.

use serde::{Deserialize, Serialize};

use super::id::{CartId, CartItemId, ProductId};
use super::price::Price;

/// Errors that can occur when validating cart input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemError {
    /// Quantity must be a positive integer.
    #[error("quantity must be greater than zero")]
    ZeroQuantity,
    /// Quantity does not fit the cart's quantity type.
    #[error("quantity {0} is out of range")]
    QuantityOutOfRange(i64),
    /// Product name is empty.
    #[error("product name cannot be empty")]
    EmptyName,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Server-assigned line ID. `None` for guest lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<CartItemId>,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    /// Always greater than zero.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A guest cart line as persisted in client storage, keyed by product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<GuestCartItem> for CartItem {
    fn from(item: GuestCartItem) -> Self {
        Self {
            item_id: None,
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
        }
    }
}

impl From<NewCartItem> for GuestCartItem {
    fn from(item: NewCartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
        }
    }
}

/// Input for adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NewCartItem {
    /// Build an add-to-cart input with no image.
    #[must_use]
    pub fn new(product_id: ProductId, name: impl Into<String>, price: Price, quantity: u32) -> Self {
        Self {
            product_id,
            name: name.into(),
            price,
            quantity,
            image: None,
        }
    }

    /// Attach a product image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check the input before it reaches either cart.
    ///
    /// Prices are non-negative by construction.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero or the name is blank.
    pub fn validate(&self) -> Result<(), CartItemError> {
        if self.quantity == 0 {
            return Err(CartItemError::ZeroQuantity);
        }
        if self.name.trim().is_empty() {
            return Err(CartItemError::EmptyName);
        }
        Ok(())
    }
}

/// A `(product, quantity)` pair sent to the server when merging a guest cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl From<&GuestCartItem> for MergeLine {
    fn from(item: &GuestCartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// The unified cart presented to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    cart_id: Option<CartId>,
    items: Vec<CartItem>,
    subtotal: Price,
    total_items: u64,
}

impl CartState {
    /// An empty guest cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cart from line items, dropping any line with zero quantity.
    #[must_use]
    pub fn new(cart_id: Option<CartId>, items: Vec<CartItem>) -> Self {
        let items: Vec<CartItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
        let subtotal = items.iter().map(CartItem::line_total).sum();
        let total_items = items.iter().map(|i| u64::from(i.quantity)).sum();
        Self {
            cart_id,
            items,
            subtotal,
            total_items,
        }
    }

    /// Build a guest cart (no server cart ID) from persisted lines.
    #[must_use]
    pub fn from_guest(items: &[GuestCartItem]) -> Self {
        Self::new(None, items.iter().cloned().map(CartItem::from).collect())
    }

    /// Server cart ID, `None` in guest mode.
    #[must_use]
    pub const fn cart_id(&self) -> Option<CartId> {
        self.cart_id
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Σ price × quantity.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Σ quantity.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: i64, price: u64, quantity: u32) -> CartItem {
        CartItem {
            item_id: None,
            product_id: ProductId::new(product),
            name: format!("Product {product}"),
            price: Price::from_dong(price),
            quantity,
            image: None,
        }
    }

    #[test]
    fn test_derived_totals() {
        let cart = CartState::new(None, vec![line(101, 50_000, 2), line(102, 30_000, 1)]);
        assert_eq!(cart.subtotal(), Price::from_dong(130_000));
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_zero_quantity_lines_dropped() {
        let cart = CartState::new(Some(CartId::new(9)), vec![line(101, 50_000, 0), line(102, 30_000, 1)]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.cart_id(), Some(CartId::new(9)));
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartState::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::zero());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_new_cart_item_validation() {
        let item = NewCartItem::new(ProductId::new(1), "Serum", Price::from_dong(1), 0);
        assert_eq!(item.validate(), Err(CartItemError::ZeroQuantity));

        let item = NewCartItem::new(ProductId::new(1), "  ", Price::from_dong(1), 1);
        assert_eq!(item.validate(), Err(CartItemError::EmptyName));

        let item = NewCartItem::new(ProductId::new(1), "Serum", Price::from_dong(1), 1);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_guest_item_wire_format() {
        let item = GuestCartItem {
            product_id: ProductId::new(101),
            name: "Facial".to_string(),
            price: Price::from_dong(50_000),
            quantity: 2,
            image: None,
        };
        let json = serde_json::to_value(&item).unwrap_or_default();
        assert_eq!(json["productId"], 101);
        assert_eq!(json["price"], 50_000);
        assert!(json.get("image").is_none());
    }
}
