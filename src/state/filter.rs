/// Filter engine
///
/// Derives the visible subset of the catalog from the search term and the
/// brand selector. Owns no state of its own and is safe to re-run whenever
/// either input or the catalog changes.

use tracing::warn;

use super::catalog::Catalog;
use super::data::Product;
use super::notify::Notifier;
use super::validation::{validate_brand, validate_search_term};

/// Raw filter inputs as the user typed or picked them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    /// Empty means "all brands"
    pub selected_brand: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty() || !self.selected_brand.is_empty()
    }

    pub fn clear(&mut self) {
        self.search_term.clear();
        self.selected_brand.clear();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Run one filter pass.
    ///
    /// Search narrows first, then brand (intersection). An input that fails
    /// validation is cleared in `state`, reported, and the pass falls back
    /// to the whole catalog.
    pub fn apply<'a, N>(
        &self,
        catalog: &'a Catalog,
        state: &mut FilterState,
        notifier: &N,
    ) -> Vec<&'a Product>
    where
        N: Notifier + ?Sized,
    {
        let mut visible: Vec<&Product> = catalog.products().iter().collect();

        if !state.search_term.is_empty() {
            match validate_search_term(&state.search_term) {
                Ok(term) if term.is_empty() => {}
                Ok(term) => {
                    let needle = term.to_lowercase();
                    visible.retain(|p| p.matches_lowercase(&needle));
                }
                Err(e) => {
                    warn!(error = %e, "search term rejected");
                    notifier.show_error(&format!("Filter error: {}", e));
                    state.search_term.clear();
                    return catalog.products().iter().collect();
                }
            }
        }

        if !state.selected_brand.is_empty() {
            match validate_brand(&state.selected_brand, catalog.brands()) {
                Ok(brand) if brand.is_empty() => {}
                Ok(brand) => visible.retain(|p| p.brand == brand),
                Err(e) => {
                    warn!(error = %e, "brand selection rejected");
                    notifier.show_error(&format!("Filter error: {}", e));
                    state.selected_brand.clear();
                    return catalog.products().iter().collect();
                }
            }
        }

        visible
    }
}
