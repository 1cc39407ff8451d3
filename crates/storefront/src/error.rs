//! Cart error type and Sentry breadcrumbs.
//!
//! Server failures never reach callers of the cart: they switch the cart to
//! local storage instead. `CartError` therefore only carries local storage
//! failures and rejected input.

use ayanavita_core::{CartItemError, CartMode, ProductId};
use thiserror::Error;

use crate::storage::StorageError;

/// Error returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading or writing the local store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The input was rejected before reaching either cart.
    #[error("Invalid cart input: {0}")]
    Invalid(#[from] CartItemError),

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    LineNotFound(ProductId),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Record a Sentry breadcrumb for cart activity.
///
/// The breadcrumb carries the mode the cart is in afterwards and is raised to
/// warning level once the cart has fallen back to local storage. A no-op when
/// Sentry is not initialized.
pub fn cart_breadcrumb(mode: CartMode, message: &str, data: &[(&str, &str)]) {
    sentry::add_breadcrumb(breadcrumb(mode, message, data));
}

fn breadcrumb(mode: CartMode, message: &str, data: &[(&str, &str)]) -> sentry::Breadcrumb {
    let level = if mode.allows_server() {
        sentry::Level::Info
    } else {
        sentry::Level::Warning
    };

    let mut fields: sentry::protocol::Map<String, serde_json::Value> = data
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
        .collect();
    fields.insert("mode".to_string(), serde_json::Value::from(mode.to_string()));

    sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(message.to_string()),
        level,
        data: fields,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::LineNotFound(ProductId::new(101));
        assert_eq!(err.to_string(), "Product 101 is not in the cart");

        let err = CartError::from(CartItemError::ZeroQuantity);
        assert_eq!(
            err.to_string(),
            "Invalid cart input: quantity must be greater than zero"
        );
    }

    #[test]
    fn test_breadcrumb_records_mode() {
        let crumb = breadcrumb(CartMode::LocalFallback, "Switched to local cart", &[("operation", "add_item")]);
        assert_eq!(crumb.category.as_deref(), Some("cart"));
        assert_eq!(crumb.level, sentry::Level::Warning);
        assert_eq!(crumb.data["operation"], "add_item");
        assert_eq!(crumb.data["mode"], "local_fallback");

        let crumb = breadcrumb(CartMode::ServerBacked, "Merged guest cart", &[]);
        assert_eq!(crumb.level, sentry::Level::Info);
        assert_eq!(crumb.data.len(), 1);
    }

    #[test]
    fn test_breadcrumb_without_sentry_client() {
        // Must not panic when no Sentry client is bound.
        cart_breadcrumb(CartMode::ServerBacked, "test", &[("product_id", "101")]);
    }
}
