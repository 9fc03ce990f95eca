//! Unified storefront error type.
//!
//! Each subsystem has its own error enum; `StorefrontError` wraps them so
//! callers that drive several subsystems (the CLI) can use one `Result`.

use fakestore_core::ProductDraftError;
use thiserror::Error;

use crate::auth::AuthError;
use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart session operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Sign-in or sign-out failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Product form input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ProductDraftError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
