//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AYANAVITA_API_URL` - Base URL of the backend REST service
//!
//! ## Optional
//! - `AYANAVITA_DATA_DIR` - Directory for the local key-value store (default: `.ayanavita`)
//! - `AYANAVITA_AUTH_POLL_MS` - Credential polling interval in ms, 1-999 (default: 500)
//! - `AYANAVITA_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Polling must stay under one second so stale sign-in state is noticed quickly.
const MAX_AUTH_POLL_MS: u64 = 999;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API configuration
    pub api: ApiConfig,
    /// Directory backing the local key-value store
    pub data_dir: PathBuf,
    /// How often the stored credential is re-checked
    pub auth_poll_interval: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. `production`, `staging`)
    pub sentry_environment: Option<String>,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; cart paths are resolved relative to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create an API configuration with the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("AYANAVITA_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("AYANAVITA_API_URL".to_string()))?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("AYANAVITA_API_URL".to_string(), e.to_string())
        })?;

        let timeout_secs = parse_or_default::<u64>(&lookup, "AYANAVITA_HTTP_TIMEOUT_SECS", 10)?;
        let poll_ms = parse_or_default::<u64>(&lookup, "AYANAVITA_AUTH_POLL_MS", 500)?;
        if poll_ms == 0 || poll_ms > MAX_AUTH_POLL_MS {
            return Err(ConfigError::InvalidEnvVar(
                "AYANAVITA_AUTH_POLL_MS".to_string(),
                format!("must be between 1 and {MAX_AUTH_POLL_MS} (got {poll_ms})"),
            ));
        }

        let data_dir = lookup("AYANAVITA_DATA_DIR").map_or_else(|| PathBuf::from(".ayanavita"), PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            data_dir,
            auth_poll_interval: Duration::from_millis(poll_ms),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
