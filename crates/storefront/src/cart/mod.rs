//! Cart state for guests and signed-in customers.
//!
//! - [`guest`] - Guest cart lines in the local key-value store
//! - [`CartReconciler`] - One cart over the guest cart and the server cart
//! - [`SharedCart`] - A reconciler shared across tasks, following sign-in changes

pub mod guest;
mod reconciler;
mod shared;

pub use guest::GuestCart;
pub use reconciler::CartReconciler;
pub use shared::SharedCart;
