/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the validation layer, the comparison controller and the UI layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of products in a comparison at once
pub const MAX_COMPARISON_PRODUCTS: usize = 3;

/// The comparison panel opens automatically at this many products
pub const MIN_COMPARISON_PRODUCTS: usize = 2;

/// Represents a single product in the catalog
///
/// Values of this type only come out of `validation::validate_product`,
/// so every field already satisfies the product schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique catalog ID (always > 0)
    pub id: u64,
    /// Display name (e.g., "Pixel 8 Pro")
    pub name: String,
    /// Manufacturer, used by the brand filter
    pub brand: String,
    /// Absolute URL of the product image
    pub image: String,
    /// Price in whole currency units
    pub price: f64,
    /// Headline features, in display order
    pub features: Vec<String>,
    /// Specification table; keys vary per product
    pub specs: BTreeMap<String, String>,
}

impl Product {
    /// Case-insensitive substring match against name, brand and features.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.brand.to_lowercase().contains(needle)
            || self
                .features
                .iter()
                .any(|feature| feature.to_lowercase().contains(needle))
    }

    /// Look up a specification value by name
    pub fn spec(&self, name: &str) -> Option<&str> {
        self.specs.get(name).map(String::as_str)
    }
}
