/// Comparison controller
///
/// Owns the comparison selection (at most three products, no duplicate
/// ids) and is the only writer of its persisted copy. Expected rejections
/// (full list, duplicate, unknown id) come back as outcome values and a
/// warning notification; they are not errors.

use tracing::{debug, error, info, warn};

use super::data::{Product, MAX_COMPARISON_PRODUCTS, MIN_COMPARISON_PRODUCTS};
use super::loader::{restore_selection, SelectionRestore};
use super::notify::Notifier;
use super::store::{KeyValueStore, COMPARE_LIST_KEY};
use super::validation::{check_product, check_product_id, validate_selection, SchemaError};

/// Ordered set of products chosen for side-by-side comparison.
///
/// Only built from lists that passed `validate_selection`, and never
/// mutated in place: every change produces a new instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSelection(Vec<Product>);

impl ComparisonSelection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a selection, enforcing every list invariant
    pub fn from_products(products: Vec<Product>) -> Result<Self, SchemaError> {
        validate_selection(&products)?;
        Ok(Self(products))
    }

    pub fn products(&self) -> &[Product] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_COMPARISON_PRODUCTS
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.0.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// Single source of truth for "may this product be added right now"
    pub fn can_add(&self, id: u64) -> bool {
        !self.is_full() && !self.contains(id)
    }

    fn with_added(&self, product: &Product) -> Result<Self, SchemaError> {
        let mut next = self.0.clone();
        next.push(product.clone());
        Self::from_products(next)
    }

    fn without(&self, id: u64) -> Result<Self, SchemaError> {
        let next = self.0.iter().filter(|p| p.id != id).cloned().collect();
        Self::from_products(next)
    }
}

/// Result of [`ComparisonController::add`]
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added { len: usize },
    Full,
    AlreadyPresent,
    Invalid(SchemaError),
}

/// Result of [`ComparisonController::remove`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed { len: usize },
    NotFound,
    Invalid(SchemaError),
}

pub struct ComparisonController<S, N> {
    selection: ComparisonSelection,
    show_panel: bool,
    loaded: bool,
    store: S,
    notifier: N,
}

impl<S: KeyValueStore, N: Notifier> ComparisonController<S, N> {
    /// Create an empty controller. Call [`restore`](Self::restore) before
    /// accepting user mutations; mutations that arrive first load lazily.
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            selection: ComparisonSelection::empty(),
            show_panel: false,
            loaded: false,
            store,
            notifier,
        }
    }

    pub fn selection(&self) -> &ComparisonSelection {
        &self.selection
    }

    pub fn products(&self) -> &[Product] {
        self.selection.products()
    }

    pub fn show_panel(&self) -> bool {
        self.show_panel
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn can_add(&self, id: u64) -> bool {
        self.selection.can_add(id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.selection.contains(id)
    }

    /// Startup reconciliation with the persisted comparison list.
    ///
    /// Invalid members are dropped with a single warning. If the survivors
    /// still do not form a valid list, the persisted key is cleared and the
    /// selection starts empty.
    pub fn restore(&mut self, raw: Option<&str>) {
        match restore_selection(raw) {
            SelectionRestore::Nothing => {
                debug!("no saved comparison list");
            }
            SelectionRestore::Restored { products, dropped } => {
                self.selection = ComparisonSelection(products);
                self.show_panel = self.selection.len() >= MIN_COMPARISON_PRODUCTS;
                info!(
                    restored = self.selection.len(),
                    dropped, "comparison list restored"
                );

                if dropped > 0 {
                    self.notifier.show_warning(
                        "Some invalid products were removed from your comparison list.",
                    );
                }
            }
            SelectionRestore::Discarded(e) => {
                error!(error = %e, "failed to load saved comparison list");
                self.selection = ComparisonSelection::empty();
                self.show_panel = false;
                self.notifier
                    .show_error("Failed to load saved comparison list. Starting fresh.");

                if let Err(e) = self.store.remove(COMPARE_LIST_KEY) {
                    error!(error = %e, "failed to clear saved comparison list");
                }
            }
        }

        self.loaded = true;
    }

    /// Restore straight from the store if startup has not done it yet
    fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }

        let raw = match self.store.get(COMPARE_LIST_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "failed to read saved comparison list");
                None
            }
        };
        self.restore(raw.as_deref());
    }

    /// Append a product to the comparison
    pub fn add(&mut self, product: &Product) -> AddOutcome {
        self.ensure_loaded();

        if let Err(e) = check_product(product) {
            warn!(field = ?e.field(), error = %e, "rejected invalid product");
            self.notifier
                .show_error(&format!("Cannot add product: {}", e));
            return AddOutcome::Invalid(e);
        }

        if self.selection.is_full() {
            self.notifier.show_warning(&format!(
                "Cannot add more products. Maximum {} products can be compared at once.",
                MAX_COMPARISON_PRODUCTS
            ));
            return AddOutcome::Full;
        }

        if self.selection.contains(product.id) {
            self.notifier.show_warning(&format!(
                "{} is already in your comparison list.",
                product.name
            ));
            return AddOutcome::AlreadyPresent;
        }

        let next = match self.selection.with_added(product) {
            Ok(next) => next,
            Err(e) => {
                error!(error = %e, "comparison list failed validation after add");
                self.notifier
                    .show_error(&format!("Cannot add product: {}", e));
                return AddOutcome::Invalid(e);
            }
        };
        self.commit(next);

        let len = self.selection.len();
        self.notifier.show_success(&format!(
            "{} added to comparison. {} of {} products selected.",
            product.name, len, MAX_COMPARISON_PRODUCTS
        ));

        if len >= MIN_COMPARISON_PRODUCTS {
            self.show_panel = true;
        }

        AddOutcome::Added { len }
    }

    /// Remove the product with `id` from the comparison
    pub fn remove(&mut self, id: u64) -> RemoveOutcome {
        self.ensure_loaded();

        if let Err(e) = check_product_id(id) {
            warn!(id, "rejected invalid product id");
            self.notifier
                .show_error(&format!("Cannot remove product: {}", e));
            return RemoveOutcome::Invalid(e);
        }

        let Some(name) = self.selection.get(id).map(|p| p.name.clone()) else {
            self.notifier
                .show_warning("Product not found in comparison list.");
            return RemoveOutcome::NotFound;
        };

        let next = match self.selection.without(id) {
            Ok(next) => next,
            Err(e) => {
                error!(error = %e, "comparison list failed validation after remove");
                self.notifier
                    .show_error(&format!("Cannot remove product: {}", e));
                return RemoveOutcome::Invalid(e);
            }
        };
        self.commit(next);

        let len = self.selection.len();
        self.notifier.show_success(&format!(
            "{} removed from comparison. {} products remaining.",
            name, len
        ));

        if len < MIN_COMPARISON_PRODUCTS {
            self.show_panel = false;
        }

        RemoveOutcome::Removed { len }
    }

    /// Empty the comparison. Returns how many products were removed.
    pub fn clear(&mut self) -> usize {
        self.ensure_loaded();

        let count = self.selection.len();
        self.commit(ComparisonSelection::empty());
        self.show_panel = false;
        self.notifier.show_success(&format!(
            "Comparison cleared. {} products removed from comparison.",
            count
        ));

        count
    }

    /// Show or hide the comparison panel. Only honoured while at least two
    /// products are selected; returns whether the request was applied.
    pub fn set_show_panel(&mut self, visible: bool) -> bool {
        if self.selection.len() < MIN_COMPARISON_PRODUCTS {
            return false;
        }
        self.show_panel = visible;
        true
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.set_show_panel(!self.show_panel)
    }

    fn commit(&mut self, next: ComparisonSelection) {
        self.selection = next;
        self.persist();
    }

    /// Best-effort write of the current selection
    fn persist(&self) {
        let result = serde_json::to_string(self.selection.products())
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(COMPARE_LIST_KEY, &json)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => debug!(len = self.selection.len(), "comparison list saved"),
            Err(e) => {
                error!(error = %e, "failed to save comparison list");
                self.notifier
                    .show_error("Failed to save comparison list to storage.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::{arb_product, product, product_json};
    use crate::state::notify::{Notification, NotificationQueue, Severity};
    use crate::state::store::fixtures::ReadOnlyStore;
    use crate::state::store::MemoryStore;
    use proptest::prelude::*;
    use serde_json::json;

    type TestController = ComparisonController<MemoryStore, NotificationQueue>;

    fn controller() -> (TestController, MemoryStore, NotificationQueue) {
        let store = MemoryStore::new();
        let queue = NotificationQueue::new();
        let mut controller = ComparisonController::new(store.clone(), queue.clone());
        controller.restore(None);
        (controller, store, queue)
    }

    fn last(queue: &NotificationQueue) -> Notification {
        queue.drain().pop().unwrap()
    }

    fn saved_ids(store: &MemoryStore) -> Vec<u64> {
        let raw = store.get(COMPARE_LIST_KEY).unwrap().unwrap();
        let saved: Vec<Product> = serde_json::from_str(&raw).unwrap();
        saved.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_add_appends_and_persists() {
        let (mut c, store, queue) = controller();

        assert_eq!(c.add(&product(1, "Alpha", "X")), AddOutcome::Added { len: 1 });

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.message, "Alpha added to comparison. 1 of 3 products selected.");
        assert_eq!(saved_ids(&store), vec![1]);
        assert!(!c.show_panel());
    }

    #[test]
    fn test_fourth_add_is_a_warning() {
        let (mut c, store, queue) = controller();
        for id in 1..=3 {
            c.add(&product(id, &format!("P{}", id), "X"));
        }
        queue.drain();

        assert_eq!(c.add(&product(4, "P4", "X")), AddOutcome::Full);

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(
            n.message,
            "Cannot add more products. Maximum 3 products can be compared at once."
        );
        assert_eq!(c.products().len(), 3);
        assert_eq!(saved_ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_add_names_the_product() {
        let (mut c, _store, queue) = controller();
        c.add(&product(1, "Alpha", "X"));
        queue.drain();

        assert_eq!(c.add(&product(1, "Alpha", "X")), AddOutcome::AlreadyPresent);

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.message, "Alpha is already in your comparison list.");
        assert_eq!(c.products().len(), 1);
    }

    #[test]
    fn test_invalid_product_is_an_error() {
        let (mut c, _store, queue) = controller();
        let mut bad = product(1, "Alpha", "X");
        bad.image = "not a url".to_string();

        assert!(matches!(c.add(&bad), AddOutcome::Invalid(_)));

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Error);
        assert_eq!(n.message, "Cannot add product: Product image must be a valid URL");
        assert!(c.products().is_empty());
    }

    #[test]
    fn test_remove() {
        let (mut c, store, queue) = controller();
        c.add(&product(1, "Alpha", "X"));
        c.add(&product(2, "Beta", "Y"));
        assert!(c.show_panel());
        queue.drain();

        assert_eq!(c.remove(1), RemoveOutcome::Removed { len: 1 });

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.message, "Alpha removed from comparison. 1 products remaining.");
        assert!(!c.show_panel());
        assert_eq!(saved_ids(&store), vec![2]);
    }

    #[test]
    fn test_remove_missing_id_warns() {
        let (mut c, _store, queue) = controller();
        c.add(&product(1, "Alpha", "X"));
        queue.drain();

        assert_eq!(c.remove(9), RemoveOutcome::NotFound);

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.message, "Product not found in comparison list.");
        assert_eq!(c.products().len(), 1);
    }

    #[test]
    fn test_remove_zero_id_is_an_error() {
        let (mut c, _store, queue) = controller();

        assert!(matches!(c.remove(0), RemoveOutcome::Invalid(_)));
        assert_eq!(last(&queue).severity, Severity::Error);
    }

    #[test]
    fn test_clear_on_empty_still_reports() {
        let (mut c, store, queue) = controller();

        assert_eq!(c.clear(), 0);

        let n = last(&queue);
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.message, "Comparison cleared. 0 products removed from comparison.");
        assert!(saved_ids(&store).is_empty());
    }

    #[test]
    fn test_clear_hides_panel() {
        let (mut c, _store, _queue) = controller();
        c.add(&product(1, "Alpha", "X"));
        c.add(&product(2, "Beta", "Y"));

        assert_eq!(c.clear(), 2);
        assert!(!c.show_panel());
        assert!(c.products().is_empty());
    }

    #[test]
    fn test_manual_panel_toggle_needs_two_products() {
        let (mut c, _store, _queue) = controller();
        c.add(&product(1, "Alpha", "X"));

        assert!(!c.toggle_panel());
        assert!(!c.show_panel());

        c.add(&product(2, "Beta", "Y"));
        assert!(c.show_panel());
        assert!(c.toggle_panel());
        assert!(!c.show_panel());
        assert!(c.set_show_panel(true));
        assert!(c.show_panel());
    }

    #[test]
    fn test_can_add_predicate() {
        let (mut c, _store, _queue) = controller();
        assert!(c.can_add(1));

        c.add(&product(1, "A", "X"));
        assert!(!c.can_add(1));
        assert!(c.contains(1));

        c.add(&product(2, "B", "X"));
        c.add(&product(3, "C", "X"));
        assert!(!c.can_add(4));
    }

    #[test]
    fn test_restore_round_trip() {
        let (mut c, store, _queue) = controller();
        c.add(&product(1, "Alpha", "X"));
        c.add(&product(2, "Beta", "Y"));

        let queue = NotificationQueue::new();
        let mut reloaded = ComparisonController::new(store.clone(), queue.clone());
        let raw = store.get(COMPARE_LIST_KEY).unwrap();
        reloaded.restore(raw.as_deref());

        assert_eq!(reloaded.selection(), c.selection());
        assert!(reloaded.show_panel());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_restore_drops_invalid_members_with_one_warning() {
        let store = MemoryStore::new();
        let queue = NotificationQueue::new();
        let raw = json!([product_json(1, "Alpha", "X"), { "id": 2, "name": "" }]).to_string();
        store.set(COMPARE_LIST_KEY, &raw).unwrap();

        let mut c = ComparisonController::new(store.clone(), queue.clone());
        c.restore(Some(&raw));

        assert_eq!(c.products().len(), 1);
        assert_eq!(c.products()[0].id, 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].severity, Severity::Warning);
        assert_eq!(
            drained[0].message,
            "Some invalid products were removed from your comparison list."
        );
    }

    #[test]
    fn test_restore_discards_corrupt_list_and_clears_key() {
        let store = MemoryStore::new();
        let queue = NotificationQueue::new();
        store.set(COMPARE_LIST_KEY, "[{").unwrap();

        let mut c = ComparisonController::new(store.clone(), queue.clone());
        c.restore(Some("[{"));

        assert!(c.products().is_empty());
        assert!(c.is_loaded());
        assert_eq!(store.get(COMPARE_LIST_KEY).unwrap(), None);
        let n = last(&queue);
        assert_eq!(n.severity, Severity::Error);
        assert_eq!(n.message, "Failed to load saved comparison list. Starting fresh.");
    }

    #[test]
    fn test_mutation_before_restore_loads_first() {
        let store = MemoryStore::new();
        let saved = serde_json::to_string(&vec![product(1, "Alpha", "X")]).unwrap();
        store.set(COMPARE_LIST_KEY, &saved).unwrap();

        let mut c = ComparisonController::new(store.clone(), NotificationQueue::new());
        assert!(!c.is_loaded());

        assert_eq!(c.add(&product(2, "Beta", "Y")), AddOutcome::Added { len: 2 });
        assert!(c.is_loaded());
        assert_eq!(saved_ids(&store), vec![1, 2]);
    }

    #[test]
    fn test_write_failure_is_reported_not_fatal() {
        let store = ReadOnlyStore::default();
        let queue = NotificationQueue::new();
        let mut c = ComparisonController::new(store, queue.clone());
        c.restore(None);

        assert_eq!(c.add(&product(1, "Alpha", "X")), AddOutcome::Added { len: 1 });

        let drained = queue.drain();
        assert!(drained
            .iter()
            .any(|n| n.severity == Severity::Error
                && n.message == "Failed to save comparison list to storage."));
        assert_eq!(drained.last().unwrap().severity, Severity::Success);
        assert_eq!(c.products().len(), 1);
    }

    #[test]
    fn test_selection_rejects_invalid_lists() {
        assert!(ComparisonSelection::from_products(vec![
            product(1, "A", "X"),
            product(1, "A", "X")
        ])
        .is_err());
        assert!(ComparisonSelection::from_products(vec![product(1, "A", "X")]).is_ok());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(Product),
        Remove(u64),
        Clear,
        TogglePanel,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => arb_product().prop_map(Op::Add),
            2 => (0u64..=6).prop_map(Op::Remove),
            1 => Just(Op::Clear),
            1 => Just(Op::TogglePanel),
        ]
    }

    proptest! {
        #[test]
        fn test_invariants_hold_for_any_sequence(ops in prop::collection::vec(arb_op(), 0..24)) {
            let (mut c, store, _queue) = controller();

            for op in &ops {
                match op {
                    Op::Add(p) => {
                        c.add(p);
                    }
                    Op::Remove(id) => {
                        c.remove(*id);
                    }
                    Op::Clear => {
                        c.clear();
                    }
                    Op::TogglePanel => {
                        c.toggle_panel();
                    }
                }

                let ids: Vec<u64> = c.products().iter().map(|p| p.id).collect();
                let mut unique = ids.clone();
                unique.sort_unstable();
                unique.dedup();
                prop_assert!(ids.len() <= MAX_COMPARISON_PRODUCTS);
                prop_assert_eq!(unique.len(), ids.len());
                prop_assert!(validate_selection(c.products()).is_ok());
                if ids.len() < MIN_COMPARISON_PRODUCTS {
                    prop_assert!(!c.show_panel());
                }
                if store.get(COMPARE_LIST_KEY).unwrap().is_some() {
                    prop_assert_eq!(saved_ids(&store), ids);
                }
            }
        }

        #[test]
        fn test_saved_selection_restores_equal(products in prop::collection::vec(arb_product(), 0..6)) {
            let (mut c, store, _queue) = controller();
            for p in &products {
                c.add(p);
            }

            let queue = NotificationQueue::new();
            let mut reloaded = ComparisonController::new(store.clone(), queue.clone());
            let raw = store.get(COMPARE_LIST_KEY).unwrap();
            reloaded.restore(raw.as_deref());

            prop_assert_eq!(reloaded.selection(), c.selection());
            prop_assert!(queue.is_empty());
        }
    }
}
