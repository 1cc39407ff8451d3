//! CLI command implementations.
//!
//! Cart commands start from a [`Page`], which mirrors what the storefront does
//! on every page load: open the local store, read the stored token, and
//! refresh the cart.

pub mod account;
pub mod cart;
pub mod prefs;

use ayanavita_core::CartState;
use ayanavita_storefront::api::{ApiError, CartApi, HttpCartApi};
use ayanavita_storefront::auth::{CredentialSource, StoredCredential};
use ayanavita_storefront::cart::CartReconciler;
use ayanavita_storefront::config::StorefrontConfig;
use ayanavita_storefront::error::CartError;
use ayanavita_storefront::preferences::UnknownLanguage;
use ayanavita_storefront::storage::{FileStore, KeyValueStore, StorageError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    #[error("could not create API client: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Language(#[from] UnknownLanguage),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential backed by the file store.
pub type FileCredential = StoredCredential<FileStore>;

/// Reconciler used by the CLI.
pub type FileCart = CartReconciler<HttpCartApi<FileCredential>, FileStore>;

/// One "page load": a refreshed cart plus the credential it was built from.
pub struct Page {
    pub cart: FileCart,
    pub credentials: FileCredential,
}

impl Page {
    /// Build the reconciler from configuration and load the initial cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened, the HTTP client
    /// cannot be built, or the guest cart cannot be read.
    pub async fn load(config: &StorefrontConfig) -> Result<Self, CommandError> {
        let store = FileStore::open(&config.data_dir)?;
        let credentials = StoredCredential::new(store.clone());
        let authenticated = credentials.is_signed_in();
        let api = HttpCartApi::new(&config.api, credentials.clone())?;

        let mut cart = CartReconciler::new(api, store, authenticated);
        cart.refresh().await?;
        tracing::debug!(mode = %cart.mode(), authenticated, "Cart loaded");

        Ok(Self { cart, credentials })
    }
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print the page's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn cart(self, page: &Page) -> Result<(), CommandError> {
        self.reconciler(&page.cart)
    }

    /// Print a reconciler's cart with its mode and sign-in state.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn reconciler<A: CartApi, S: KeyValueStore>(
        self,
        cart: &CartReconciler<A, S>,
    ) -> Result<(), CommandError> {
        let text = if self.json {
            serde_json::to_string_pretty(&serde_json::json!({
                "mode": cart.mode(),
                "authenticated": cart.is_authenticated(),
                "cart": cart.state(),
            }))?
        } else {
            render(cart.state(), &header(cart))
        };

        #[allow(clippy::print_stdout)]
        {
            println!("{text}");
        }
        Ok(())
    }
}

fn header<A: CartApi, S: KeyValueStore>(cart: &CartReconciler<A, S>) -> String {
    let who = if cart.is_authenticated() {
        "signed in"
    } else {
        "guest"
    };
    format!("Cart ({who}, {})", cart.mode())
}

/// Plain-text cart table.
fn render(state: &CartState, header: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::from(header);
    if state.is_empty() {
        out.push_str("\n  (empty)");
        return out;
    }

    for item in state.items() {
        let _ = write!(
            out,
            "\n  {:>6}  {:<28} {:>3} x {:>12}  {:>14}",
            item.product_id.as_i64(),
            item.name,
            item.quantity,
            item.price.display(),
            item.line_total().display(),
        );
    }
    let _ = write!(
        out,
        "\nSubtotal: {} ({} items)",
        state.subtotal().display(),
        state.total_items()
    );
    out
}

#[cfg(test)]
mod tests {
    use ayanavita_core::{CartItem, Price, ProductId};

    use super::*;

    #[test]
    fn test_render_empty_cart() {
        let out = render(&CartState::empty(), "Cart (guest, server_backed)");
        assert_eq!(out, "Cart (guest, server_backed)\n  (empty)");
    }

    #[test]
    fn test_render_lines_and_subtotal() {
        let state = CartState::new(
            None,
            vec![
                CartItem {
                    item_id: None,
                    product_id: ProductId::new(101),
                    name: "Facial".to_string(),
                    price: Price::from_dong(50_000),
                    quantity: 2,
                    image: None,
                },
                CartItem {
                    item_id: None,
                    product_id: ProductId::new(102),
                    name: "Massage".to_string(),
                    price: Price::from_dong(30_000),
                    quantity: 1,
                    image: None,
                },
            ],
        );

        let out = render(&state, "Cart");
        assert!(out.contains("Facial"));
        assert!(out.contains("100.000 ₫"));
        assert!(out.ends_with("Subtotal: 130.000 ₫ (3 items)"));
    }
}
