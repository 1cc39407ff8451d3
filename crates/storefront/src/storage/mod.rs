//! Injected key-value storage.
//!
//! Everything the storefront keeps on the client (guest cart, access token,
//! language preference, saved posts) goes through [`KeyValueStore`] instead of
//! ambient global storage, so tests can swap in [`MemoryStore`].
//!
//! Values are JSON strings. There is no schema versioning: a value that no
//! longer parses is treated as absent.

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage keys used by the storefront.
pub mod keys {
    /// Guest cart lines (JSON array of `GuestCartItem`).
    pub const GUEST_CART: &str = "ayanavita.guest_cart";

    /// Bearer token of the signed-in customer.
    pub const ACCESS_TOKEN: &str = "ayanavita.access_token";

    /// Preferred UI language.
    pub const LANGUAGE: &str = "ayanavita.language";

    /// Saved blog post IDs (JSON array).
    pub const SAVED_POSTS: &str = "ayanavita.saved_posts";
}

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key contains characters the backend cannot store.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store with `get`/`set`/`remove`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and deserialize a JSON value.
///
/// Malformed values are logged and treated as absent.
///
/// # Errors
///
/// Returns an error only if the store itself fails.
pub fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored value");
            Ok(None)
        }
    }
}

/// Serialize and write a JSON value.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        set_json(&store, "ids", &[3_i64, 1, 2]).unwrap();

        let ids: Option<Vec<i64>> = get_json(&store, "ids").unwrap();
        assert_eq!(ids, Some(vec![3, 1, 2]));
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<i64>> = get_json(&store, "nothing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_malformed_value_is_none() {
        let store = MemoryStore::new();
        store.set("ids", "{not json").unwrap();

        let value: Option<Vec<i64>> = get_json(&store, "ids").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_arc_store_shares_data() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }
}
