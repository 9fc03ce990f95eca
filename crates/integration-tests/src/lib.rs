//! Integration tests for the FakeStore storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fakestore-integration-tests
//! ```
//!
//! The tests never touch the public API. [`MockCatalog`] serves a small
//! fixed catalog over the same routes on an ephemeral local port.
//!
//! # Test Categories
//!
//! - `catalog_client` - HTTP client against the mock catalog
//! - `cart_flow` - Catalog products flowing into persisted cart sessions

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use fakestore_storefront::catalog::CatalogClient;
use fakestore_storefront::config::CatalogConfig;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// Product ID the mock answers with `500 Internal Server Error`.
pub const FAILING_PRODUCT_ID: i64 = 999;

/// ID the mock assigns to created products.
pub const CREATED_PRODUCT_ID: i64 = 21;

/// The fixed catalog. Product 4 has no `rating`, as some API rows do.
#[must_use]
pub fn fixture_products() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 109.95,
            "description": "Your perfect pack for everyday use and walks in the forest.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }),
        json!({
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "description": "Slim-fitting style, contrast raglan long sleeve.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
            "rating": { "rate": 4.1, "count": 259 }
        }),
        json!({
            "id": 3,
            "title": "John Hardy Women's Legends Naga Bracelet",
            "price": 695,
            "description": "From our Legends Collection, the Naga was inspired by the mythical water dragon.",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/71pWzhdJNwL._AC_UL640_QL65_ML3_.jpg",
            "rating": { "rate": 4.6, "count": 400 }
        }),
        json!({
            "id": 4,
            "title": "Opna Women's Short Sleeve Moisture",
            "price": 7.95,
            "description": "100% Polyester, machine wash, lightweight and breathable.",
            "category": "women's clothing",
            "image": "https://fakestoreapi.com/img/51eg55uWmdL._AC_UX679_.jpg"
        }),
    ]
}

#[derive(Default)]
struct MockState {
    last_body: Mutex<Option<Value>>,
}

/// A FakeStore-compatible catalog served from [`fixture_products`].
pub struct MockCatalog {
    base_url: Url,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockCatalog {
    /// Bind an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/products", get(list_products).post(create_product))
            .route("/products/categories", get(list_categories))
            .route("/products/category/{name}", get(products_in_category))
            .route(
                "/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = Url::parse(&format!("http://{addr}")).unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
        }
    }

    /// A client pointed at this server.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&self.config()).expect("failed to build catalog client")
    }

    /// JSON body of the most recent POST or PUT.
    #[must_use]
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn find(id: i64) -> Option<Value> {
    fixture_products()
        .into_iter()
        .find(|product| product["id"] == json!(id))
}

async fn list_products() -> Json<Value> {
    Json(Value::Array(fixture_products()))
}

async fn list_categories() -> Json<Value> {
    Json(json!(["electronics", "jewelery", "men's clothing", "women's clothing"]))
}

async fn products_in_category(Path(name): Path<String>) -> Json<Value> {
    let products = fixture_products()
        .into_iter()
        .filter(|product| product["category"] == json!(name))
        .collect();
    Json(Value::Array(products))
}

async fn get_product(Path(id): Path<i64>) -> Response {
    if id == FAILING_PRODUCT_ID {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    // Unknown IDs get 200 with an empty body, like the real API.
    find(id).map_or_else(
        || StatusCode::OK.into_response(),
        |product| Json(product).into_response(),
    )
}

async fn create_product(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_body.lock().unwrap() = Some(body.clone());
    let mut product = body;
    product["id"] = json!(CREATED_PRODUCT_ID);
    Json(product)
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    *state.last_body.lock().unwrap() = Some(body.clone());
    let mut product = body;
    product["id"] = json!(id);
    Json(product)
}

async fn delete_product(Path(id): Path<i64>) -> Response {
    find(id).map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |product| Json(product).into_response(),
    )
}
