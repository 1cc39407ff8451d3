//! Cart source-of-truth mode.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where cart operations are sent.
///
/// A cart starts out `ServerBacked`. The first failed server call switches it
/// to `LocalFallback`, and it stays there for the lifetime of the cart. A new
/// cart (the next full page load or process start) starts `ServerBacked`
/// again; there is no retry within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartMode {
    /// Authenticated operations go to the backend REST service.
    #[default]
    ServerBacked,
    /// The server cart failed this session; only local storage is used.
    LocalFallback,
}

impl CartMode {
    /// Whether server calls may be attempted in this mode.
    #[must_use]
    pub const fn allows_server(self) -> bool {
        matches!(self, Self::ServerBacked)
    }
}

impl fmt::Display for CartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerBacked => f.write_str("server_backed"),
            Self::LocalFallback => f.write_str("local_fallback"),
        }
    }
}
