//! Client caches that live next to the guest cart: language preference and
//! saved blog posts.

use core::fmt;
use core::str::FromStr;

use ayanavita_core::PostId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError, get_json, keys, set_json};

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Vietnamese.
    #[default]
    Vi,
    /// English.
    En,
}

/// Error parsing a [`Language`] code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported language: {0} (expected vi or en)")]
pub struct UnknownLanguage(pub String);

impl Language {
    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Typed access to the preference keys of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored language, or the default when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn language(&self) -> Result<Language, StorageError> {
        Ok(get_json(&self.store, keys::LANGUAGE)?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_language(&self, language: Language) -> Result<(), StorageError> {
        set_json(&self.store, keys::LANGUAGE, &language)
    }

    /// Saved post IDs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn saved_posts(&self) -> Result<Vec<PostId>, StorageError> {
        Ok(get_json(&self.store, keys::SAVED_POSTS)?.unwrap_or_default())
    }

    /// Save a post, or unsave it if already saved. Returns whether it is now saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn toggle_saved_post(&self, post_id: PostId) -> Result<bool, StorageError> {
        let mut posts = self.saved_posts()?;
        let saved = if let Some(pos) = posts.iter().position(|id| *id == post_id) {
            posts.remove(pos);
            false
        } else {
            posts.push(post_id);
            true
        };
        set_json(&self.store, keys::SAVED_POSTS, &posts)?;
        Ok(saved)
    }
}
