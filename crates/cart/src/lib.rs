//! RocketShoes Cart - cart state with catalog sync and local persistence.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and is constructed explicitly with its
//!   collaborators; nothing is looked up from ambient state
//! - [`catalog::CatalogClient`] supplies product info and stock
//! - [`storage::KeyValueStorage`] persists the cart as a JSON array
//! - Operations return `Result<Cart, CartError>`; [`notify::report`] turns a
//!   failure into a single user-facing message
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, HttpCatalogClient, FileStorage};
//! use rocketshoes_cart::notify::{TracingSink, report};
//!
//! let config = CartConfig::from_env()?;
//! let catalog = HttpCatalogClient::new(&config.catalog)?;
//! let storage = FileStorage::new(&config.storage_path);
//! let store = CartStore::open(catalog, storage, &config.cart_key)?;
//!
//! report(&TracingSink, store.add_product(ProductId::new(1)).await);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, HttpCatalogClient};
pub use config::{CartConfig, CatalogConfig, ConfigError, DEFAULT_CART_KEY};
pub use error::{CartError, CartOperation};
pub use notify::{NotificationSink, RecordingSink, TracingSink, report};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::CartStore;

pub use rocketshoes_core::{
    Cart, CartItem, Price, ProductId, ProductInfo, StockInfo, UpdateProductAmount,
};
