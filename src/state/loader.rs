/// Persisted-state loader
///
/// Runs once at startup. Reads the raw entries from the key/value store,
/// parses and validates them, and reports what survived. Applying the
/// result (and cleaning up bad keys) is up to the owner of each entry.

use serde_json::Value;
use tracing::{error, warn};

use super::data::Product;
use super::notify::Notifier;
use super::store::{KeyValueStore, StoreError, COMPARE_LIST_KEY, DARK_MODE_KEY};
use super::validation::{
    sanitize_local_storage_data, validate_comparison_list, validate_product, ParseError,
    SchemaError,
};

/// Raw persisted entries, exactly as stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub compare_list: Option<String>,
    pub dark_mode: Option<String>,
}

/// Why a persisted comparison list was thrown away
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RestoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result of reconciling the persisted comparison list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionRestore {
    /// Nothing usable was stored (missing key or not a list)
    Nothing,
    /// The valid members, plus how many invalid entries were dropped
    Restored { products: Vec<Product>, dropped: usize },
    /// The whole entry must be discarded
    Discarded(RestoreError),
}

/// Result of reading the dark mode preference
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeRestore {
    Missing,
    Restored(bool),
    /// Parsed fine but was not a boolean
    Ignored,
    Corrupt(ParseError),
}

/// Read both persisted entries. A failing store is reported once and
/// treated as empty.
pub fn read_persisted<S, N>(store: &S, notifier: &N) -> PersistedSnapshot
where
    S: KeyValueStore + ?Sized,
    N: Notifier + ?Sized,
{
    let read = || -> Result<PersistedSnapshot, StoreError> {
        Ok(PersistedSnapshot {
            compare_list: store.get(COMPARE_LIST_KEY)?,
            dark_mode: store.get(DARK_MODE_KEY)?,
        })
    };

    match read() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, "failed to read persisted state");
            notifier.show_error(
                "Failed to load application data. Some features may not work correctly.",
            );
            PersistedSnapshot::default()
        }
    }
}

/// Reconcile a persisted comparison list.
///
/// Members are validated one by one and invalid ones dropped; the
/// survivors must then pass as a whole list or everything is discarded.
pub fn restore_selection(raw: Option<&str>) -> SelectionRestore {
    let Some(raw) = raw else {
        return SelectionRestore::Nothing;
    };

    let parsed = match sanitize_local_storage_data(raw) {
        Ok(parsed) => parsed,
        Err(e) => return SelectionRestore::Discarded(e.into()),
    };

    let Some(items) = parsed.as_array() else {
        warn!("persisted comparison list is not a list, ignoring it");
        return SelectionRestore::Nothing;
    };

    let kept: Vec<Value> = items
        .iter()
        .filter(|item| match validate_product(item) {
            Ok(_) => true,
            Err(e) => {
                warn!(field = ?e.field(), error = %e, "invalid product in saved comparison list");
                false
            }
        })
        .cloned()
        .collect();
    let dropped = items.len() - kept.len();

    match validate_comparison_list(&Value::Array(kept)) {
        Ok(products) => SelectionRestore::Restored { products, dropped },
        Err(e) => SelectionRestore::Discarded(e.into()),
    }
}

/// Interpret a persisted dark mode flag
pub fn restore_theme(raw: Option<&str>) -> ThemeRestore {
    let Some(raw) = raw else {
        return ThemeRestore::Missing;
    };

    match sanitize_local_storage_data(raw) {
        Ok(Value::Bool(dark)) => ThemeRestore::Restored(dark),
        Ok(_) => ThemeRestore::Ignored,
        Err(e) => ThemeRestore::Corrupt(e),
    }
}
