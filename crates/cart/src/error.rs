//! Cart operation errors.
//!
//! Every failed operation leaves the cart exactly as it was. Each error maps
//! to one of the fixed user-facing messages via [`CartError::user_message`];
//! rendering that message is the caller's job (see [`crate::notify`]).

use core::fmt;

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// User-facing message for a failed add.
pub const ADD_FAILED: &str = "Erro na adição do produto";
/// User-facing message for a failed remove.
pub const REMOVE_FAILED: &str = "Erro na remoção do produto";
/// User-facing message for a failed quantity change.
pub const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";
/// User-facing message when the requested quantity exceeds stock.
pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";

/// The cart operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
    Clear,
}

impl CartOperation {
    /// Generic failure message for this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => ADD_FAILED,
            Self::Remove | Self::Clear => REMOVE_FAILED,
            Self::UpdateAmount => UPDATE_FAILED,
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update amount",
            Self::Clear => "clear",
        })
    }
}

/// Errors returned by cart store operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Requested quantity is below one.
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i32 },

    /// Requested quantity exceeds available stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Fetching product info or stock failed.
    #[error("Catalog error during {operation}: {source}")]
    Catalog {
        operation: CartOperation,
        #[source]
        source: CatalogError,
    },

    /// Persisting the cart failed.
    #[error("Storage error during {operation}: {source}")]
    Storage {
        operation: CartOperation,
        #[source]
        source: StorageError,
    },
}

impl CartError {
    /// The fixed message to show the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotInCart(_) => REMOVE_FAILED,
            Self::InvalidAmount { .. } => UPDATE_FAILED,
            Self::OutOfStock { .. } => OUT_OF_STOCK,
            Self::Catalog { operation, .. } | Self::Storage { operation, .. } => {
                operation.failure_message()
            }
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let id = ProductId::new(1);
        assert_eq!(CartError::NotInCart(id).user_message(), REMOVE_FAILED);
        assert_eq!(
            CartError::InvalidAmount {
                product_id: id,
                amount: 0
            }
            .user_message(),
            UPDATE_FAILED
        );
        assert_eq!(
            CartError::OutOfStock {
                product_id: id,
                requested: 6,
                available: 5
            }
            .user_message(),
            OUT_OF_STOCK
        );
    }

    #[test]
    fn test_catalog_error_message_follows_operation() {
        let add = CartError::Catalog {
            operation: CartOperation::Add,
            source: CatalogError::NotFound("products/42".to_string()),
        };
        assert_eq!(add.user_message(), ADD_FAILED);

        let update = CartError::Catalog {
            operation: CartOperation::UpdateAmount,
            source: CatalogError::NotFound("stock/42".to_string()),
        };
        assert_eq!(update.user_message(), UPDATE_FAILED);
    }

    #[test]
    fn test_storage_error_message_follows_operation() {
        let err = CartError::Storage {
            operation: CartOperation::Remove,
            source: StorageError::Poisoned,
        };
        assert_eq!(err.user_message(), REMOVE_FAILED);
        assert_eq!(
            err.to_string(),
            "Storage error during remove: Storage lock poisoned"
        );
    }

    #[test]
    fn test_out_of_stock_display() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(3),
            requested: 6,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "Requested 6 of product 3, only 5 in stock"
        );
    }
}
