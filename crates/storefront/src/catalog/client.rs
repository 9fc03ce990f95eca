//! FakeStore catalog API client implementation.

use std::sync::Arc;

use fakestore_core::{Product, ProductDraft, ProductId};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use super::CatalogError;
use crate::config::CatalogConfig;

/// Longest body excerpt kept on errors and in logs.
const BODY_EXCERPT_CHARS: usize = 500;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the FakeStore catalog API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidBaseUrl` if paths cannot be appended to
    /// the base URL, or `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fakestore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, or bad JSON.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products"])?;
        self.fetch(self.request(Method::GET, url)).await
    }

    /// Fetch a single product.
    ///
    /// The API answers an unknown ID with `200` and an empty body; that is
    /// reported as `CatalogError::NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, unknown
    /// product, or bad JSON.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let body = self.send(self.request(Method::GET, url)).await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            error!(product_id = %id, "Catalog has no such product");
            return Err(CatalogError::NotFound(id));
        }
        parse(&body)
    }

    /// Fetch the category names.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, or bad JSON.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["products", "categories"])?;
        self.fetch(self.request(Method::GET, url)).await
    }

    /// Fetch the products in one category.
    ///
    /// The category name is sent as a single percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, or bad JSON.
    #[instrument(skip(self))]
    pub async fn list_products_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products", "category", category])?;
        self.fetch(self.request(Method::GET, url)).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a product; the catalog assigns its ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, or bad JSON.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products"])?;
        let product: Product = self
            .fetch(self.request(Method::POST, url).json(draft))
            .await?;
        debug!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status, or bad JSON.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.fetch(self.request(Method::PUT, url).json(draft)).await
    }

    /// Delete a product. Any 2xx response counts as success.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure or non-2xx status.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        self.send(self.request(Method::DELETE, url)).await?;
        debug!(product_id = %id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Append path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and parse a JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CatalogError> {
        let body = self.send(request).await?;
        parse(&body)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, CatalogError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Catalog request failed");
            CatalogError::Http(e)
        })?;

        let status = response.status();
        let url = response.url().clone();

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(|e| {
            error!(error = %e, %url, "Failed to read catalog response body");
            CatalogError::Http(e)
        })?;

        if !status.is_success() {
            let excerpt = excerpt(&body);
            error!(
                status = %status,
                %url,
                body = %excerpt,
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status,
                body: excerpt,
            });
        }

        debug!(status = %status, %url, bytes = body.len(), "Catalog response");
        Ok(body)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            error = %e,
            body = %excerpt(body),
            "Failed to parse catalog response"
        );
        CatalogError::Parse(e)
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
