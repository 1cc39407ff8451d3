//! Integration tests for AYANAVITA.
//!
//! Provides [`MockBackend`], an in-process axum server that speaks the backend
//! cart REST API. Tests point the real `HttpCartApi` at it, so requests go over
//! a socket exactly as they would in production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ayanavita-integration-tests
//! ```
//!
//! # Behaviour
//!
//! - Carts are kept per bearer token; unknown tokens get `401`
//! - `POST /cart/merge` prices lines from the catalog; unknown products get `422`
//! - [`MockState::set_failing`] makes every authorized request return `503`
//! - Every request is recorded, including rejected ones

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use ayanavita_core::{CartId, CartItemId, NewCartItem, Price, ProductId};
use ayanavita_storefront::api::REQUEST_ID_HEADER;
use ayanavita_storefront::api::types::{MergeRequest, ServerCart, ServerCartLine, UpdateItemRequest};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use url::Url;

// =============================================================================
// State
// =============================================================================

/// A request as seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    price: Price,
}

#[derive(Debug, Default)]
struct Inner {
    tokens: HashSet<String>,
    carts: HashMap<String, ServerCart>,
    catalog: HashMap<ProductId, CatalogEntry>,
    next_cart_id: i64,
    next_line_id: i64,
    failing: bool,
    requests: Vec<RecordedRequest>,
}

impl Inner {
    fn cart_mut(&mut self, token: &str) -> &mut ServerCart {
        let next_cart_id = &mut self.next_cart_id;
        self.carts.entry(token.to_string()).or_insert_with(|| {
            *next_cart_id += 1;
            ServerCart {
                id: CartId::new(*next_cart_id),
                items: Vec::new(),
            }
        })
    }

    fn next_line_id(&mut self) -> CartItemId {
        self.next_line_id += 1;
        CartItemId::new(self.next_line_id)
    }

    /// Add to an existing line for the product or append a new one.
    fn add_line(&mut self, token: &str, product_id: ProductId, quantity: u32) -> Option<()> {
        let entry = self.catalog.get(&product_id)?.clone();
        let cart = self.cart_mut(token);
        if let Some(line) = cart.items.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return Some(());
        }

        let id = self.next_line_id();
        self.cart_mut(token).items.push(ServerCartLine {
            id,
            product_id,
            name: entry.name,
            price: entry.price,
            quantity,
            image: None,
        });
        Some(())
    }
}

/// Shared, inspectable state of a [`MockBackend`].
#[derive(Debug, Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept `token` as a signed-in customer.
    pub fn accept_token(&self, token: &str) {
        self.lock().tokens.insert(token.to_string());
    }

    /// Make a product known so merges can price it.
    pub fn add_product(&self, product_id: i64, name: &str, price: u64) {
        self.lock().catalog.insert(
            ProductId::new(product_id),
            CatalogEntry {
                name: name.to_string(),
                price: Price::from_dong(price),
            },
        );
    }

    /// Put a line into a customer's server cart. The product must be in the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the product has not been added with [`Self::add_product`].
    pub fn seed_line(&self, token: &str, product_id: i64, quantity: u32) {
        if self
            .lock()
            .add_line(token, ProductId::new(product_id), quantity)
            .is_none()
        {
            panic!("product {product_id} is not in the mock catalog");
        }
    }

    /// Make every authorized request fail with `503`.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// The customer's server cart, if one exists.
    #[must_use]
    pub fn cart(&self, token: &str) -> Option<ServerCart> {
        self.lock().carts.get(token).cloned()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }
}

// =============================================================================
// Router
// =============================================================================

/// Bearer token of an authorized request.
#[derive(Debug, Clone)]
struct Token(String);

/// Build the mock cart API router.
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/cart", get(show_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{item_id}", patch(update_item).delete(remove_item))
        .route("/cart/merge", post(merge))
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Record the request, check the bearer token, and apply failure injection.
async fn authorize(State(state): State<MockState>, mut request: Request, next: Next) -> Response {
    let authorization = header_value(request.headers(), header::AUTHORIZATION.as_str());
    let request_id = header_value(request.headers(), REQUEST_ID_HEADER);

    let (authorized, failing) = {
        let mut inner = state.lock();
        inner.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: authorization.clone(),
            request_id,
        });

        let token = authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| inner.tokens.contains(*token))
            .map(String::from);
        (token, inner.failing)
    };

    let Some(token) = authorized else {
        return (StatusCode::UNAUTHORIZED, "invalid or missing token").into_response();
    };
    if failing {
        return (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable").into_response();
    }

    request.extensions_mut().insert(Token(token));
    next.run(request).await
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

type HandlerResult = Result<Json<ServerCart>, (StatusCode, &'static str)>;

async fn show_cart(State(state): State<MockState>, Extension(Token(token)): Extension<Token>) -> HandlerResult {
    Ok(Json(state.lock().cart_mut(&token).clone()))
}

async fn add_item(
    State(state): State<MockState>,
    Extension(Token(token)): Extension<Token>,
    Json(item): Json<NewCartItem>,
) -> HandlerResult {
    if item.validate().is_err() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "invalid cart item"));
    }

    let mut inner = state.lock();
    // Adding teaches the catalog the product's name and price
    inner.catalog.entry(item.product_id).or_insert_with(|| CatalogEntry {
        name: item.name.clone(),
        price: item.price,
    });
    let _ = inner.add_line(&token, item.product_id, item.quantity);
    if let Some(image) = item.image
        && let Some(line) = inner
            .cart_mut(&token)
            .items
            .iter_mut()
            .find(|l| l.product_id == item.product_id)
    {
        line.image = Some(image);
    }
    Ok(Json(inner.cart_mut(&token).clone()))
}

async fn update_item(
    State(state): State<MockState>,
    Extension(Token(token)): Extension<Token>,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> HandlerResult {
    let mut inner = state.lock();
    let cart = inner.cart_mut(&token);
    let pos = cart
        .items
        .iter()
        .position(|l| l.id == item_id)
        .ok_or((StatusCode::NOT_FOUND, "cart line not found"))?;

    if body.quantity == 0 {
        cart.items.remove(pos);
    } else if let Some(line) = cart.items.get_mut(pos) {
        line.quantity = body.quantity;
    }
    Ok(Json(cart.clone()))
}

async fn remove_item(
    State(state): State<MockState>,
    Extension(Token(token)): Extension<Token>,
    Path(item_id): Path<CartItemId>,
) -> HandlerResult {
    let mut inner = state.lock();
    let cart = inner.cart_mut(&token);
    let before = cart.items.len();
    cart.items.retain(|l| l.id != item_id);
    if cart.items.len() == before {
        return Err((StatusCode::NOT_FOUND, "cart line not found"));
    }
    Ok(Json(cart.clone()))
}

async fn merge(
    State(state): State<MockState>,
    Extension(Token(token)): Extension<Token>,
    Json(body): Json<MergeRequest>,
) -> HandlerResult {
    let mut inner = state.lock();
    if body.items.iter().any(|l| !inner.catalog.contains_key(&l.product_id)) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "unknown product in merge"));
    }
    for line in body.items.iter().filter(|l| l.quantity > 0) {
        let _ = inner.add_line(&token, line.product_id, line.quantity);
    }
    tracing::debug!(lines = body.items.len(), "Merged guest lines");
    Ok(Json(inner.cart_mut(&token).clone()))
}

// =============================================================================
// Server
// =============================================================================

/// A mock backend listening on a random local port.
///
/// The server stops when this value is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = MockState::default();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = router(state.clone());
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL of the running server.
    ///
    /// # Panics
    ///
    /// Never in practice; a socket address always forms a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("socket address is a valid URL")
    }

    /// Inspect or configure the backend.
    #[must_use]
    pub const fn state(&self) -> &MockState {
        &self.state
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}
