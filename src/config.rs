/// Application configuration.
///
/// Uses `figment` for layered configuration: defaults -> config file -> environment.
/// The config file lives at `<config_dir>/product-compare/config.toml`; environment
/// variables are prefixed with `PRODUCT_COMPARE_` (e.g. `PRODUCT_COMPARE_LOG_FILTER`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted-state database (platform data dir if unset).
    pub data_dir: Option<PathBuf>,
    /// JSON catalog replacing the bundled one.
    pub catalog_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// How long a notification banner stays up.
    pub notification_timeout_ms: u64,
    /// Quiet period after the last keystroke before the search runs.
    pub search_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            catalog_path: None,
            log_filter: "info".to_string(),
            notification_timeout_ms: 6000,
            search_debounce_ms: 300,
        }
    }
}

/// Location of the user-level config file, if the platform has one.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("product-compare").join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `PRODUCT_COMPARE_`)
/// 2. The config file at `config_file`, when it exists
/// 3. Built-in defaults
pub fn load_config(config_file: Option<&Path>) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_file {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }

    figment = figment.merge(Env::prefixed("PRODUCT_COMPARE_"));

    figment.extract().map_err(Box::new)
}
