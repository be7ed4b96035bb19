//! Catalog payloads: product info and stock levels.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by `GET products/{id}`.
///
/// Only `id` matters to cart logic. Any attributes the catalog sends beyond
/// the known ones are kept in `extra` so they survive a trip through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Product image URL.
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductInfo {
    /// Create product info with no extra attributes.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// Available inventory for a product, as returned by `GET stock/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub id: ProductId,
    pub amount: u32,
}
