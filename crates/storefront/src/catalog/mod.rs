//! Remote catalog client for the FakeStore REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest`; one request per call
//! - The catalog is the source of truth for products. Nothing is cached and
//!   nothing is retried; callers decide how to present failures
//! - Any non-2xx response is a failure carrying the HTTP status, and a
//!   transport failure is reported the same way through [`CatalogError`]
//!
//! # Endpoints
//!
//! | Operation                         | Request                         |
//! |-----------------------------------|---------------------------------|
//! | [`CatalogClient::list_products`]  | `GET /products`                 |
//! | [`CatalogClient::get_product`]    | `GET /products/{id}`            |
//! | [`CatalogClient::list_categories`]| `GET /products/categories`      |
//! | [`CatalogClient::list_products_in_category`] | `GET /products/category/{name}` |
//! | [`CatalogClient::create_product`] | `POST /products`                |
//! | [`CatalogClient::update_product`] | `PUT /products/{id}`            |
//! | [`CatalogClient::delete_product`] | `DELETE /products/{id}`         |
//!
//! # Example
//!
//! ```rust,ignore
//! use fakestore_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let product = client.get_product(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::CatalogClient;

use fakestore_core::ProductId;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Catalog API returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// First part of the response body, for diagnostics.
        body: String,
    },

    /// The API answered 2xx with an empty body for a product lookup.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource paths cannot be appended to the configured base URL.
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(Url),
}

impl CatalogError {
    /// The HTTP status associated with this failure, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Http(err) => err.status(),
            Self::Parse(_) | Self::InvalidBaseUrl(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = CatalogError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Catalog API returned 500 Internal Server Error: boom"
        );
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = CatalogError::NotFound(ProductId::new(9999));
        assert_eq!(err.to_string(), "Product not found: 9999");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_parse_error_has_no_status() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(CatalogError::Parse(parse).status(), None);
    }
}
