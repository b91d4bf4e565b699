//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to the paths the store ships
//! with:
//!
//! - `STORE_CATALOG_PATH` - Product catalog document (default: `data/products.json`)
//! - `STORE_ORDERS_DIR` - Directory exported order files are written to (default: `orders`)
//! - `STORE_EXPORT_MODE` - `per-order` or `daily` (default: `per-order`)

use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportMode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the product catalog document.
    pub catalog_path: PathBuf,
    /// Directory exported order files are written to.
    pub orders_dir: PathBuf,
    /// Naming scheme for exported order files.
    pub export_mode: ExportMode,
}

impl StoreConfig {
    /// Build a configuration explicitly, bypassing the environment.
    #[must_use]
    pub fn new(
        catalog_path: impl Into<PathBuf>,
        orders_dir: impl Into<PathBuf>,
        export_mode: ExportMode,
    ) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            orders_dir: orders_dir.into(),
            export_mode,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORE_EXPORT_MODE` is set to an
    /// unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog_path = get_env_or_default("STORE_CATALOG_PATH", "data/products.json");
        let orders_dir = get_env_or_default("STORE_ORDERS_DIR", "orders");
        let export_mode = get_env_or_default("STORE_EXPORT_MODE", "per-order")
            .parse::<ExportMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_EXPORT_MODE".to_string(), e))?;

        Ok(Self {
            catalog_path: PathBuf::from(catalog_path),
            orders_dir: PathBuf::from(orders_dir),
            export_mode,
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("data/products.json", "orders", ExportMode::default())
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = StoreConfig::default();
        assert_eq!(config.catalog_path, PathBuf::from("data/products.json"));
        assert_eq!(config.orders_dir, PathBuf::from("orders"));
        assert_eq!(config.export_mode, ExportMode::PerOrder);
    }

    #[test]
    fn test_from_env_with_overrides() {
        // set_var is unsafe in edition 2024; this test owns these keys
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("STORE_CATALOG_PATH", "/srv/catalog.json");
            std::env::set_var("STORE_ORDERS_DIR", "/srv/orders");
            std::env::set_var("STORE_EXPORT_MODE", "daily");
        }

        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/srv/catalog.json"));
        assert_eq!(config.orders_dir, PathBuf::from("/srv/orders"));
        assert_eq!(config.export_mode, ExportMode::Daily);

        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("STORE_CATALOG_PATH");
            std::env::remove_var("STORE_ORDERS_DIR");
            std::env::remove_var("STORE_EXPORT_MODE");
        }
    }

    #[test]
    fn test_invalid_export_mode_is_rejected() {
        let err = "weekly".parse::<ExportMode>().unwrap_err();
        let wrapped = ConfigError::InvalidEnvVar("STORE_EXPORT_MODE".to_string(), err);
        assert!(wrapped.to_string().contains("STORE_EXPORT_MODE"));
    }
}
