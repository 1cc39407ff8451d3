//! `reqwest` implementation of [`CartApi`].

use std::sync::Arc;

use ayanavita_core::{CartItemId, CartState, MergeLine, NewCartItem};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::types::{MergeRequest, ServerCart, UpdateItemRequest};
use super::{ApiError, CartApi};
use crate::auth::CredentialSource;
use crate::config::ApiConfig;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest response body excerpt kept in errors and logs.
const MAX_BODY_EXCERPT: usize = 200;

// =============================================================================
// HttpCartApi
// =============================================================================

/// Client for the backend cart endpoints.
///
/// Attaches the customer's bearer token and a fresh request ID to every call.
/// Cheaply cloneable via `Arc`.
pub struct HttpCartApi<C> {
    inner: Arc<HttpCartApiInner<C>>,
}

struct HttpCartApiInner<C> {
    client: reqwest::Client,
    base_url: Url,
    credentials: C,
}

impl<C> Clone for HttpCartApi<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for HttpCartApi<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartApi")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl<C: CredentialSource> HttpCartApi<C> {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig, credentials: C) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        // `Url::join` replaces the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(HttpCartApiInner {
                client,
                base_url,
                credentials,
            }),
        })
    }

    /// The normalized base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Send a request and parse the returned cart.
    async fn execute<B: serde::Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<CartState, ApiError> {
        let token = self
            .inner
            .credentials
            .access_token()
            .ok_or(ApiError::MissingToken)?;
        let url = self.inner.base_url.join(path)?;
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .inner
            .client
            .request(method.clone(), url)
            .bearer_auth(token.expose_secret())
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            let body = excerpt(&response_text);
            tracing::error!(
                status = %status,
                %method,
                path,
                request_id = %request_id,
                body = %body,
                "Cart API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let cart: ServerCart = match serde_json::from_str(&response_text) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    request_id = %request_id,
                    body = %excerpt(&response_text),
                    "Failed to parse cart API response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        debug!(%method, path, request_id = %request_id, lines = cart.items.len(), "Cart API call succeeded");
        Ok(CartState::from(cart))
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}

impl<C: CredentialSource> CartApi for HttpCartApi<C> {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<CartState, ApiError> {
        self.execute::<()>(Method::GET, "cart", None).await
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    async fn add_item(&self, item: &NewCartItem) -> Result<CartState, ApiError> {
        self.execute(Method::POST, "cart/items", Some(item)).await
    }

    #[instrument(skip(self))]
    async fn update_item(&self, item_id: CartItemId, quantity: u32) -> Result<CartState, ApiError> {
        let body = UpdateItemRequest { quantity };
        self.execute(Method::PATCH, &format!("cart/items/{item_id}"), Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, item_id: CartItemId) -> Result<CartState, ApiError> {
        self.execute::<()>(Method::DELETE, &format!("cart/items/{item_id}"), None)
            .await
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn merge_items(&self, lines: &[MergeLine]) -> Result<CartState, ApiError> {
        let body = MergeRequest {
            items: lines.to_vec(),
        };
        self.execute(Method::POST, "cart/merge", Some(&body)).await
    }
}
