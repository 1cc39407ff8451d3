//! Wire types for the backend cart API.
//!
//! Shared with the mock backend used in integration tests.

use ayanavita_core::{CartId, CartItem, CartItemId, CartState, MergeLine, Price, ProductId};
use serde::{Deserialize, Serialize};

/// Cart as returned by every cart endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCart {
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<ServerCartLine>,
}

/// A line in a [`ServerCart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<ServerCart> for CartState {
    fn from(cart: ServerCart) -> Self {
        let items = cart
            .items
            .into_iter()
            .map(|line| CartItem {
                item_id: Some(line.id),
                product_id: line.product_id,
                name: line.name,
                price: line.price,
                quantity: line.quantity,
                image: line.image,
            })
            .collect();
        // Zero-quantity lines are dropped here
        Self::new(Some(cart.id), items)
    }
}

/// Body of `PATCH /cart/items/{itemId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Body of `POST /cart/merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub items: Vec<MergeLine>,
}
