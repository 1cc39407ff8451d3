//! AYANAVITA Storefront cart library.
//!
//! Presents one cart to the UI whether or not the customer is signed in.
//! Guest carts live in a local key-value store; signed-in carts live on the
//! backend REST service. When a guest signs in, their lines are merged into
//! the server cart exactly once.
//!
//! # Architecture
//!
//! - [`storage`] - Injected key-value store (`get`/`set`/`remove`) with
//!   in-memory and file-backed implementations
//! - [`auth`] - Bearer token source and the polling [`auth::AuthWatcher`]
//! - [`api`] - Backend cart REST client over `reqwest`
//! - [`cart`] - Guest cart persistence and the [`cart::CartReconciler`]
//! - [`preferences`] - Other client caches (language, saved blog posts)
//!
//! # Example
//!
//! ```rust,ignore
//! use ayanavita_storefront::{api::HttpCartApi, auth::StoredCredential, cart::CartReconciler};
//!
//! let store = FileStore::open(&config.data_dir)?;
//! let credentials = StoredCredential::new(store.clone());
//! let authenticated = credentials.is_signed_in();
//! let api = HttpCartApi::new(&config.api, credentials)?;
//!
//! let mut cart = CartReconciler::new(api, store, authenticated);
//! cart.refresh().await?;
//! cart.add_item(NewCartItem::new(ProductId::new(101), "Facial", Price::from_dong(50_000), 2)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod preferences;
pub mod storage;
