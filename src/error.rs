/// Top-level error type.
///
/// Validation and parse failures are recoverable and already carry a
/// user-facing message. Storage and configuration failures are unexpected
/// and get a generic message. A bad catalog is fatal.

use crate::state::catalog::{CatalogError, CORRUPTED_CATALOG_MESSAGE};
use crate::state::store::StoreError;
use crate::state::validation::{ParseError, SchemaError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl AppError {
    /// Schema and parse failures degrade gracefully; everything else is
    /// either unexpected or fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Schema(_) | AppError::Parse(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Catalog(_))
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AppError::Schema(e) => e.to_string(),
            AppError::Parse(e) => e.to_string(),
            AppError::Catalog(_) => CORRUPTED_CATALOG_MESSAGE.to_string(),
            AppError::Store(_) | AppError::Config(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}
