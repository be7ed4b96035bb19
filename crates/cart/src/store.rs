//! The cart store.
//!
//! Owns the in-memory cart, restores it from storage when opened and writes
//! the whole cart back after every successful change.
//!
//! # Consistency
//!
//! - Mutations are serialized: each one holds the writer lock from validation
//!   through the catalog fetch to the storage write, so concurrent calls
//!   cannot both start from the same snapshot.
//! - Reads never wait on the writer lock. [`CartStore::cart`] returns the last
//!   committed cart, even while a mutation is waiting on the catalog.
//! - The next cart is written to storage before it replaces the in-memory
//!   cart. Any failure leaves both untouched.

use std::sync::{PoisonError, RwLock};

use rocketshoes_core::{Cart, CartItem, ProductId, UpdateProductAmount};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{CatalogClient, CatalogError};
use crate::error::{CartError, CartOperation, Result};
use crate::storage::{KeyValueStorage, StorageError};

/// Cart state container backed by a catalog client and key-value storage.
///
/// Construct one per session and hand it (or an `Arc` of it) to whatever
/// needs to read or change the cart.
pub struct CartStore<C, S> {
    catalog: C,
    storage: S,
    key: String,
    // Held by mutations for their whole validate, fetch, persist cycle
    writer: Mutex<()>,
    committed: RwLock<Cart>,
}

impl<C, S> CartStore<C, S>
where
    C: CatalogClient,
    S: KeyValueStorage,
{
    /// Open the store, restoring the cart saved under `key`.
    ///
    /// A missing entry gives an empty cart. So does an entry that is not a
    /// valid cart; it is logged and left in place until the next successful
    /// change overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage backend cannot be read.
    pub fn open(catalog: C, storage: S, key: impl Into<String>) -> std::result::Result<Self, StorageError> {
        let key = key.into();
        let cart = restore_cart(&storage, &key)?;

        Ok(Self {
            catalog,
            storage,
            key,
            writer: Mutex::new(()),
            committed: RwLock::new(cart),
        })
    }

    /// Snapshot of the last committed cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Storage key the cart is saved under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through the same stock check as
    /// [`CartStore::update_product_amount`] with its amount plus one, and
    /// fails the same way. Otherwise the product info is fetched and a new
    /// item with amount 1 is appended.
    ///
    /// # Errors
    ///
    /// - `CartError::Catalog` (add) if the product info fetch fails or the
    ///   catalog answers with a different product
    /// - any [`CartStore::update_product_amount`] error for products already in the cart
    /// - `CartError::Storage` if the cart cannot be saved
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart> {
        let _writer = self.writer.lock().await;
        let cart = self.cart();

        if let Some(existing) = cart.get(product_id) {
            let amount = existing.amount.saturating_add(1);
            debug!(amount, "Product already in cart, incrementing");
            return self.set_amount(&cart, product_id, amount).await;
        }

        let product = self
            .catalog
            .get_product(product_id)
            .await
            .map_err(|source| CartError::Catalog {
                operation: CartOperation::Add,
                source,
            })?;

        if product.id != product_id {
            warn!(returned = %product.id, "Catalog answered with a different product");
            return Err(CartError::Catalog {
                operation: CartOperation::Add,
                source: CatalogError::IdMismatch {
                    requested: product_id,
                    returned: product.id,
                },
            });
        }

        let next = cart.with_item(CartItem::new(product, 1));
        let next = self.commit(next, CartOperation::Add)?;
        info!(items = next.len(), "Product added to cart");
        Ok(next)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::NotInCart` if the product is not in the cart
    /// - `CartError::Storage` if the cart cannot be saved
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart> {
        let _writer = self.writer.lock().await;
        let cart = self.cart();

        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let next = self.commit(cart.without(product_id), CartOperation::Remove)?;
        info!(items = next.len(), "Product removed from cart");
        Ok(next)
    }

    /// Set the quantity of a product in the cart.
    ///
    /// Stock is fetched fresh on every call. A product that is not in the
    /// cart leaves the cart as it is (it is still saved).
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidAmount` if `amount < 1`; nothing is fetched
    /// - `CartError::Catalog` (update amount) if the stock fetch fails
    /// - `CartError::OutOfStock` if `amount` exceeds available stock
    /// - `CartError::Storage` if the cart cannot be saved
    #[instrument(skip(self, request), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> Result<Cart> {
        let UpdateProductAmount { product_id, amount } = request;

        let amount = u32::try_from(amount)
            .ok()
            .filter(|amount| *amount >= 1)
            .ok_or(CartError::InvalidAmount { product_id, amount })?;

        let _writer = self.writer.lock().await;
        let cart = self.cart();
        self.set_amount(&cart, product_id, amount).await
    }

    /// Empty the cart and delete its storage entry.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the entry cannot be deleted.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart> {
        let _writer = self.writer.lock().await;

        self.storage
            .remove(&self.key)
            .map_err(|source| CartError::Storage {
                operation: CartOperation::Clear,
                source,
            })?;

        self.replace(Cart::new());
        info!("Cart cleared");
        Ok(Cart::new())
    }

    /// Stock-checked quantity change. Caller holds the writer lock.
    async fn set_amount(&self, cart: &Cart, product_id: ProductId, amount: u32) -> Result<Cart> {
        let stock = self
            .catalog
            .get_stock(product_id)
            .await
            .map_err(|source| CartError::Catalog {
                operation: CartOperation::UpdateAmount,
                source,
            })?;

        if amount > stock.amount {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        if !cart.contains(product_id) {
            debug!("Product not in cart, amount change has no effect");
        }

        let next = self.commit(cart.with_amount(product_id, amount), CartOperation::UpdateAmount)?;
        info!(amount, "Product amount updated");
        Ok(next)
    }

    /// Save `next`, then make it the current cart. Caller holds the writer lock.
    fn commit(&self, next: Cart, operation: CartOperation) -> Result<Cart> {
        let encoded = serde_json::to_string(&next).map_err(|source| CartError::Storage {
            operation,
            source: StorageError::Encode {
                key: self.key.clone(),
                source,
            },
        })?;

        self.storage
            .set(&self.key, &encoded)
            .map_err(|source| CartError::Storage { operation, source })?;

        self.replace(next.clone());
        Ok(next)
    }

    fn replace(&self, cart: Cart) {
        *self
            .committed
            .write()
            .unwrap_or_else(PoisonError::into_inner) = cart;
    }
}

/// Read the saved cart, falling back to empty when absent or unreadable.
fn restore_cart<S: KeyValueStorage>(storage: &S, key: &str) -> std::result::Result<Cart, StorageError> {
    let Some(raw) = storage.get(key)? else {
        debug!(key, "No saved cart, starting empty");
        return Ok(Cart::new());
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            info!(key, items = cart.len(), "Restored saved cart");
            Ok(cart)
        }
        Err(e) => {
            warn!(key, error = %e, "Saved cart is unreadable, starting empty");
            Ok(Cart::new())
        }
    }
}
