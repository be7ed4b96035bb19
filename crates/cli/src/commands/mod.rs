//! CLI command implementations.

pub mod cart;

use rocketshoes_cart::{CatalogError, ConfigError, StorageError};
use thiserror::Error;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog client could not be built.
    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    /// The saved cart could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart operation failed. The user has already been notified.
    #[error("{0}")]
    Rejected(&'static str),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// JSON output could not be encoded.
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}
