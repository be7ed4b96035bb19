//! Cart commands.
//!
//! Each command runs one store operation and reports a failure through the
//! tracing notification sink, the way a UI would show a toast.
//!
//! # Environment Variables
//!
//! See [`rocketshoes_cart::config`].

use rocketshoes_cart::{
    Cart, CartConfig, CartError, CartStore, FileStorage, HttpCatalogClient, TracingSink, report,
};
use rocketshoes_core::{ProductId, UpdateProductAmount};
use tracing::info;

use super::CommandError;

/// The store type the CLI works with.
pub type Store = CartStore<HttpCatalogClient, FileStorage>;

/// Build the catalog client and storage, and restore the saved cart.
///
/// # Errors
///
/// Returns `CommandError` if the HTTP client cannot be built or the storage
/// file cannot be read.
pub fn open_store(config: &CartConfig) -> Result<Store, CommandError> {
    let catalog = HttpCatalogClient::new(&config.catalog)?;
    let storage = FileStorage::new(&config.storage_path);
    info!(
        api = %config.catalog.base_url,
        storage = %config.storage_path.display(),
        "Opening cart"
    );
    Ok(CartStore::open(catalog, storage, config.cart_key.clone())?)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the user message if the add fails.
pub async fn add(store: &Store, product_id: ProductId) -> Result<Cart, CommandError> {
    notify(store.add_product(product_id).await)
}

/// Remove a product.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the user message if the remove fails.
pub async fn remove(store: &Store, product_id: ProductId) -> Result<Cart, CommandError> {
    notify(store.remove_product(product_id).await)
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the user message if the update fails.
pub async fn update(store: &Store, product_id: ProductId, amount: i32) -> Result<Cart, CommandError> {
    notify(
        store
            .update_product_amount(UpdateProductAmount { product_id, amount })
            .await,
    )
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CommandError::Rejected` with the user message if the cart cannot be cleared.
pub async fn clear(store: &Store) -> Result<Cart, CommandError> {
    notify(store.clear().await)
}

fn notify(result: Result<Cart, CartError>) -> Result<Cart, CommandError> {
    match result {
        Ok(cart) => Ok(cart),
        Err(e) => {
            let message = e.user_message();
            report::<Cart>(&TracingSink, Err(e));
            Err(CommandError::Rejected(message))
        }
    }
}
