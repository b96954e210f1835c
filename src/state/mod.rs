/// State management module
///
/// This module handles all application state, including:
/// - Product data model (data.rs)
/// - Schema validation of untrusted data (validation.rs)
/// - The read-only catalog (catalog.rs)
/// - Key/value persistence (store.rs) and startup restore (loader.rs)
/// - The comparison selection (comparison.rs)
/// - Search and brand filtering (filter.rs)
/// - Theme preference (preferences.rs)
/// - Outcome notifications (notify.rs)

pub mod catalog;
pub mod comparison;
pub mod data;
pub mod filter;
pub mod loader;
pub mod notify;
pub mod preferences;
pub mod store;
pub mod validation;
