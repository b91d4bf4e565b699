//! Unified error handling for the store core.
//!
//! Each module defines its own error enum; `StoreError` folds them into
//! one type for callers that drive the whole flow. No error here is
//! process-fatal: every failure is recoverable by retrying the user
//! action that caused it.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::OrderError;
use crate::config::ConfigError;
use crate::export::ExportError;

/// Application-level error type for the store core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The product catalog is missing or corrupt.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order placement was rejected.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An order file could not be written or read.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl StoreError {
    /// Whether this error is correctable by the user re-prompting.
    ///
    /// Cart and order errors come from user input or stale UI state and
    /// are surfaced verbatim for correction. Catalog, config, and export
    /// errors are environmental; in particular an export failure must be
    /// reported as a missing invoice artifact, never as a failed order.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Cart(_) | Self::Order(_))
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
