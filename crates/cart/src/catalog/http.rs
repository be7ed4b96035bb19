//! HTTP catalog client.
//!
//! Uses `reqwest` for HTTP. Caches product info using `moka` (TTL from
//! config). Stock is always fetched fresh.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use rocketshoes_core::{ProductId, ProductInfo, StockInfo};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogClient, CatalogError};
use crate::config::CatalogConfig;

/// Client for the RocketShoes catalog API.
///
/// Cheaply cloneable; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    products: Option<Cache<ProductId, ProductInfo>>,
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products = (!config.product_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.product_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                products,
            }),
        })
    }

    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(&format!("{resource}/{product_id}"))?)
    }

    /// Execute a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let mut request = self.inner.client.get(url.clone());
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&product_id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint("products", product_id)?;
        let product: ProductInfo = self.get_json(url).await?;
        debug!(title = %product.title, "Fetched product");

        if let Some(cache) = &self.inner.products {
            cache.insert(product_id, product.clone()).await;
        }

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn get_stock(&self, product_id: ProductId) -> Result<StockInfo, CatalogError> {
        let url = self.endpoint("stock", product_id)?;
        let stock: StockInfo = self.get_json(url).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let config = CatalogConfig::new("http://localhost:3333/api").unwrap();
        let client = HttpCatalogClient::new(&config).unwrap();

        let url = client.endpoint("products", ProductId::new(7)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/products/7");

        let url = client.endpoint("stock", ProductId::new(7)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/stock/7");
    }

    #[test]
    fn test_zero_ttl_disables_product_cache() {
        let mut config = CatalogConfig::new("http://localhost:3333").unwrap();
        config.product_cache_ttl = Duration::ZERO;
        let client = HttpCatalogClient::new(&config).unwrap();
        assert!(client.inner.products.is_none());

        config.product_cache_ttl = Duration::from_secs(60);
        let client = HttpCatalogClient::new(&config).unwrap();
        assert!(client.inner.products.is_some());
    }
}
