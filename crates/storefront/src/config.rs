//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `FAKESTORE_API_URL` - Catalog API base URL (default: <https://fakestoreapi.com>)
//! - `FAKESTORE_HTTP_TIMEOUT_SECS` - Catalog request timeout (default: 30)
//! - `FAKESTORE_DATA_DIR` - Directory for the file-backed cart storage (default: .fakestore)
//! - `FAKESTORE_PERSIST` - Whether carts are persisted at all (default: true)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://fakestoreapi.com";
const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_DATA_DIR: &str = ".fakestore";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Cart persistence configuration
    pub storage: StorageConfig,
}

/// Remote catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; resource paths are appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Where carts live between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// One JSON file per cart key under the directory.
    File(PathBuf),
    /// No persistent storage is available; carts live only in memory.
    Disabled,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = Url::parse(&get_or("FAKESTORE_API_URL", DEFAULT_API_URL))
            .map_err(|e| invalid("FAKESTORE_API_URL", e))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("FAKESTORE_API_URL", "must be an absolute http(s) URL"));
        }

        let timeout_secs = get_or("FAKESTORE_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| invalid("FAKESTORE_HTTP_TIMEOUT_SECS", e))?;

        let persist = parse_bool(&get_or("FAKESTORE_PERSIST", "true"))
            .ok_or_else(|| invalid("FAKESTORE_PERSIST", "expected true or false"))?;

        let storage = if persist {
            StorageConfig::File(PathBuf::from(get_or("FAKESTORE_DATA_DIR", DEFAULT_DATA_DIR)))
        } else {
            StorageConfig::Disabled
        };

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            storage,
        })
    }
}

fn invalid(key: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
