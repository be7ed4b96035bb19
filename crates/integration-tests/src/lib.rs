//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_client` - `HttpCatalogClient` against a live HTTP server
//! - `cart_store` - `CartStore` end to end with HTTP catalog and file storage
//!
//! Tests run against [`TestCatalog`], an in-process `axum` server that serves
//! `GET /products/{id}` and `GET /stock/{id}` the way the real API does.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

/// Product id the test server answers with an unparsable body.
pub const MALFORMED_PRODUCT_ID: i32 = 666;

#[derive(Default)]
struct CatalogState {
    products: Mutex<HashMap<i32, Value>>,
    stock: Mutex<HashMap<i32, u32>>,
    failing: AtomicBool,
    product_hits: AtomicUsize,
    stock_hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

/// In-process catalog API.
#[derive(Clone)]
pub struct TestCatalog {
    addr: SocketAddr,
    state: Arc<CatalogState>,
}

impl TestCatalog {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(CatalogState::default());

        let app = Router::new()
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state })
    }

    /// Base URL to point a catalog client at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Register a product with the given stock.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        let product = json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
        });
        if let Ok(mut products) = self.state.products.lock() {
            products.insert(id, product);
        }
        self.set_stock(id, stock);
    }

    /// Change available stock for a product.
    pub fn set_stock(&self, id: i32, amount: u32) {
        if let Ok(mut stock) = self.state.stock.lock() {
            stock.insert(id, amount);
        }
    }

    /// Make every request answer 500 until turned off again.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `GET /products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `GET /stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.state
            .last_authorization
            .lock()
            .ok()
            .and_then(|auth| auth.clone())
    }
}

fn record_request(state: &CatalogState, headers: &HeaderMap) -> Option<Response> {
    if let Ok(mut last) = state.last_authorization.lock() {
        *last = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    state
        .failing
        .load(Ordering::SeqCst)
        .then(|| (StatusCode::INTERNAL_SERVER_ERROR, "catalog unavailable").into_response())
}

async fn get_product(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(failure) = record_request(&state, &headers) {
        return failure;
    }

    if id == MALFORMED_PRODUCT_ID {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"id": 666, "title": "#,
        )
            .into_response();
    }

    let product = state
        .products
        .lock()
        .ok()
        .and_then(|products| products.get(&id).cloned());

    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn get_stock(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(failure) = record_request(&state, &headers) {
        return failure;
    }

    let amount = state
        .stock
        .lock()
        .ok()
        .and_then(|stock| stock.get(&id).copied());

    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
