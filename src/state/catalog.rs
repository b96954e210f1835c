/// The product catalog
///
/// A fixed, read-only list of products. The bundled catalog is compiled
/// into the binary; a JSON file with the same shape may replace it. Either
/// way every entry is validated before the app starts, and a bad catalog
/// is the one fatal error: there is no valid base data to fall back on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::data::Product;
use super::validation::{sanitize_local_storage_data, validate_product, ParseError, SchemaError};

/// The catalog shipped with the application
const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.json");

/// Message shown instead of the app when the catalog is unusable
pub const CORRUPTED_CATALOG_MESSAGE: &str = "Application data is corrupted. Please contact support.";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] ParseError),

    #[error("Catalog must be a list of products")]
    NotAList,

    #[error("Catalog entry {index} is invalid: {source}")]
    InvalidProduct { index: usize, source: SchemaError },

    #[error("Catalog contains duplicate product id {id}")]
    DuplicateId { id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
    /// Distinct brands, first-seen order
    brands: Vec<String>,
}

impl Catalog {
    /// Load the catalog from `path`, or the bundled one when none is given
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&raw)?
            }
            None => Self::from_json(BUNDLED_CATALOG)?,
        };

        if catalog.is_empty() {
            warn!("catalog has no products");
        }
        info!(
            products = catalog.len(),
            brands = catalog.brands.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse and validate a JSON catalog
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let value = sanitize_local_storage_data(raw)?;
        let items = value.as_array().ok_or(CatalogError::NotAList)?;

        let mut seen = HashSet::with_capacity(items.len());
        let mut products = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let product = validate_product(item)
                .map_err(|source| CatalogError::InvalidProduct { index, source })?;

            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId { id: product.id });
            }
            products.push(product);
        }

        Ok(Self::from_products(products))
    }

    fn from_products(products: Vec<Product>) -> Self {
        let mut brands: Vec<String> = Vec::new();
        for product in &products {
            if !brands.contains(&product.brand) {
                brands.push(product.brand.clone());
            }
        }

        Self { products, brands }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
