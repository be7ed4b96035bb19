//! Catalog and stock API access.
//!
//! # Endpoints
//!
//! - `GET products/{id}` - Product info (title, price, image)
//! - `GET stock/{id}` - Available inventory `{id, amount}`
//!
//! The store only talks to the [`CatalogClient`] trait, so tests and
//! embedding applications can swap in their own source of products.

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use rocketshoes_core::{ProductId, ProductInfo, StockInfo};
use thiserror::Error;

pub use http::HttpCatalogClient;

/// Errors that can occur when fetching from the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success status other than 404.
    #[error("Catalog API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog answered with a different product than requested.
    #[error("Requested product {requested}, catalog returned {returned}")]
    IdMismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Source of product info and stock levels.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch product info.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product does not exist or the request fails.
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, CatalogError>;

    /// Fetch current stock. Implementations must not cache this.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the product does not exist or the request fails.
    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, CatalogError>;
}

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, CatalogError> {
        (**self).get_product(product_id).await
    }

    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, CatalogError> {
        (**self).get_stock(product_id).await
    }
}
