use tracing::{debug, error, warn};

use super::loader::{restore_theme, ThemeRestore};
use super::notify::Notifier;
use super::store::{KeyValueStore, DARK_MODE_KEY};

/// Dark mode preference, persisted independently of everything else
pub struct ThemePreference<S, N> {
    dark_mode: bool,
    loaded: bool,
    store: S,
    notifier: N,
}

impl<S: KeyValueStore, N: Notifier> ThemePreference<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            dark_mode: false,
            loaded: false,
            store,
            notifier,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Apply the persisted flag read at startup
    pub fn restore(&mut self, raw: Option<&str>) {
        match restore_theme(raw) {
            ThemeRestore::Missing => {}
            ThemeRestore::Restored(dark) => self.dark_mode = dark,
            ThemeRestore::Ignored => debug!("saved theme preference is not a boolean"),
            ThemeRestore::Corrupt(e) => {
                error!(error = %e, "failed to parse saved theme preference");
                self.notifier
                    .show_warning("Failed to load theme preference. Using default theme.");

                if let Err(e) = self.store.remove(DARK_MODE_KEY) {
                    error!(error = %e, "failed to clear saved theme preference");
                }
            }
        }

        self.loaded = true;
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;

        if self.loaded {
            self.persist();
        }
    }

    pub fn toggle(&mut self) {
        self.set_dark_mode(!self.dark_mode);
    }

    fn persist(&self) {
        let value = if self.dark_mode { "true" } else { "false" };

        if let Err(e) = self.store.set(DARK_MODE_KEY, value) {
            warn!(error = %e, "failed to save theme preference");
            self.notifier.show_warning("Failed to save theme preference.");
        }
    }
}
