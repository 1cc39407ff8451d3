//! AYANAVITA Core - Shared types library.
//!
//! This crate provides common types used across all AYANAVITA components:
//! - `storefront` - Cart reconciliation, client storage and the backend REST client
//! - `cli` - Command-line storefront
//! - `integration-tests` - Mock backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, VND prices, the cart data model and cart modes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
