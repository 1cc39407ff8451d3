//! Backend cart REST API.
//!
//! # Architecture
//!
//! - [`CartApi`] is the seam the cart reconciler talks to; tests script it
//! - [`HttpCartApi`] is the `reqwest` implementation against the backend
//! - The backend is the source of truth for signed-in carts: every call
//!   returns the full authoritative cart
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch     | `GET /cart` |
//! | add       | `POST /cart/items` |
//! | update    | `PATCH /cart/items/{itemId}` |
//! | remove    | `DELETE /cart/items/{itemId}` |
//! | merge     | `POST /cart/merge` |

mod http;
pub mod types;

use std::future::Future;

use ayanavita_core::{CartItemId, CartState, MergeLine, NewCartItem};
use thiserror::Error;

pub use http::{HttpCartApi, REQUEST_ID_HEADER};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No bearer token is stored; the request was not sent.
    #[error("No access token available")]
    MissingToken,

    /// The backend rejected the token.
    #[error("Unauthorized ({0})")]
    Unauthorized(u16),

    /// The backend returned another non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Server-side cart operations.
///
/// Every method returns the backend's authoritative cart after the operation.
pub trait CartApi: Send + Sync {
    /// Fetch the signed-in customer's cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<CartState, ApiError>> + Send;

    /// Add a product (or increase its quantity).
    fn add_item(
        &self,
        item: &NewCartItem,
    ) -> impl Future<Output = Result<CartState, ApiError>> + Send;

    /// Set a line's quantity.
    fn update_item(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartState, ApiError>> + Send;

    /// Delete a line.
    fn remove_item(
        &self,
        item_id: CartItemId,
    ) -> impl Future<Output = Result<CartState, ApiError>> + Send;

    /// Merge guest lines into the server cart in one call.
    fn merge_items(
        &self,
        lines: &[MergeLine],
    ) -> impl Future<Output = Result<CartState, ApiError>> + Send;
}
