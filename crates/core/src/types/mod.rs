//! Core types for AYANAVITA.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod mode;
pub mod price;

pub use cart::{CartItem, CartItemError, CartState, GuestCartItem, MergeLine, NewCartItem};
pub use id::*;
pub use mode::CartMode;
pub use price::{CURRENCY_CODE, Price, PriceError};
