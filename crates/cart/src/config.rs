//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL (default: `http://localhost:3333/`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the catalog API
//! - `ROCKETSHOES_STORAGE_PATH` - Local storage file (default: `rocketshoes-storage.json`)
//! - `ROCKETSHOES_CART_KEY` - Storage key for the cart (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_REQUEST_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product info cache TTL, 0 disables (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Storage key the cart is persisted under.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333/";
const DEFAULT_STORAGE_PATH: &str = "rocketshoes-storage.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Path of the local storage file
    pub storage_path: PathBuf,
    /// Key the cart is stored under
    pub cart_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so relative paths join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Product info cache TTL; zero disables the cache
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CatalogConfig {
    /// Configuration for `base_url` with default timeout and cache TTL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &get_env_or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;
        let request_timeout = parse_secs(
            "ROCKETSHOES_REQUEST_TIMEOUT_SECS",
            &get_env_or_default(
                "ROCKETSHOES_REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            ),
        )?;
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let product_cache_ttl = parse_secs(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            &get_env_or_default(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
                &DEFAULT_PRODUCT_CACHE_TTL_SECS.to_string(),
            ),
        )?;

        Ok(Self {
            base_url,
            api_token: get_optional_env("ROCKETSHOES_API_TOKEN").map(SecretString::from),
            request_timeout,
            product_cache_ttl,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog = CatalogConfig::from_env()?;
        let storage_path =
            PathBuf::from(get_env_or_default("ROCKETSHOES_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let cart_key = get_env_or_default("ROCKETSHOES_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            storage_path,
            cart_key,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an http(s) base URL, normalizing it to end with `/`.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}
