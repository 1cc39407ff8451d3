//! Shared, serialized access to one reconciler.

use std::sync::Arc;

use ayanavita_core::CartState;
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use super::CartReconciler;
use crate::api::CartApi;
use crate::storage::KeyValueStore;

/// A reconciler shared between UI handlers and the sign-in follower.
///
/// Callers take turns through an async mutex, so cart operations never
/// overlap even when issued from different tasks.
pub struct SharedCart<A, S> {
    inner: Arc<Mutex<CartReconciler<A, S>>>,
}

impl<A, S> Clone for SharedCart<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> SharedCart<A, S>
where
    A: CartApi + 'static,
    S: KeyValueStore + 'static,
{
    pub fn new(reconciler: CartReconciler<A, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(reconciler)),
        }
    }

    /// Wait for exclusive access to the reconciler.
    pub async fn lock(&self) -> MutexGuard<'_, CartReconciler<A, S>> {
        self.inner.lock().await
    }

    /// Copy of the current cart.
    pub async fn snapshot(&self) -> CartState {
        self.inner.lock().await.state().clone()
    }

    /// Apply every sign-in change from `receiver` to the cart.
    ///
    /// The current value is applied first. `on_change` runs with the cart
    /// after each applied change. The task ends when the sender is dropped.
    pub fn follow_auth<F>(&self, mut receiver: watch::Receiver<bool>, on_change: F) -> JoinHandle<()>
    where
        F: Fn(&CartReconciler<A, S>) + Send + 'static,
    {
        let cart = self.clone();
        tokio::spawn(async move {
            loop {
                let authenticated = *receiver.borrow_and_update();
                {
                    let mut reconciler = cart.inner.lock().await;
                    let before = reconciler.revision();
                    if let Err(e) = reconciler.set_authenticated(authenticated).await {
                        warn!(error = %e, authenticated, "Failed to apply sign-in change to cart");
                    }
                    if reconciler.revision() != before {
                        on_change(&*reconciler);
                    }
                }

                if receiver.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
