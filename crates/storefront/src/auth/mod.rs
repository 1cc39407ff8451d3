//! Customer authentication state.
//!
//! The storefront never validates tokens itself: a customer counts as signed
//! in while a non-empty bearer token is stored. The backend decides whether
//! the token is still good, and a rejected token is just another server
//! failure to the cart.

mod watcher;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::storage::{KeyValueStore, StorageError, keys};

pub use watcher::AuthWatcher;

/// Source of the bearer token attached to backend requests.
pub trait CredentialSource: Send + Sync {
    /// The current token, `None` when signed out.
    fn access_token(&self) -> Option<SecretString>;

    /// Whether a token is present.
    fn is_signed_in(&self) -> bool {
        self.access_token().is_some()
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn access_token(&self) -> Option<SecretString> {
        (**self).access_token()
    }
}

/// Bearer token persisted in the key-value store.
#[derive(Debug, Clone)]
pub struct StoredCredential<S> {
    store: S,
}

impl<S: KeyValueStore> StoredCredential<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist a token after sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn sign_in(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(keys::ACCESS_TOKEN, token.expose_secret())
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.store.remove(keys::ACCESS_TOKEN)
    }
}

impl<S: KeyValueStore> CredentialSource for StoredCredential<S> {
    fn access_token(&self) -> Option<SecretString> {
        match self.store.get(keys::ACCESS_TOKEN) {
            Ok(token) => token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored access token");
                None
            }
        }
    }
}
