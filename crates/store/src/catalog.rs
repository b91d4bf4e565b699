//! Product catalog loading.
//!
//! The catalog is a static JSON document holding the full product list.
//! Loading is a pure read: the document is parsed and validated in one
//! pass, and either every entry is usable or the load fails as a whole.
//! Declaration order is display order, so the loader preserves it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cotton_harbor_core::{Price, ProductId};

/// Errors that can occur when loading the catalog.
///
/// Any of these makes the product display unavailable; an in-progress cart
/// is unaffected since cart lines carry their own copies of product data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document could not be read.
    #[error("catalog file {path} is unavailable: {source}")]
    Unavailable {
        /// Path that was read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("catalog file {path} is malformed: {source}")]
    Malformed {
        /// Path that was read.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A product entry violates a catalog invariant.
    #[error("catalog entry {id:?} is invalid: {reason}")]
    InvalidEntry {
        /// The offending product ID (may be empty).
        id: String,
        /// What was wrong with the entry.
        reason: String,
    },
}

/// A product in the store.
///
/// Loaded once from the catalog document and never mutated. Prices are
/// validated non-negative by the [`Price`] type during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Plain text description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Offered sizes, in display order. Never empty.
    pub sizes: Vec<String>,
    /// Image path or URL for the presentation layer.
    pub image: String,
}

/// Top-level shape of the catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    products: Vec<Product>,
}

/// Load the product catalog from a JSON document.
///
/// Returns products in declaration order. The load is all-or-nothing: a
/// single malformed or invalid entry fails the whole catalog.
///
/// # Errors
///
/// Returns [`CatalogError::Unavailable`] if the file cannot be read,
/// [`CatalogError::Malformed`] if it is not valid JSON of the expected
/// shape, and [`CatalogError::InvalidEntry`] if an entry has an empty id,
/// a duplicate id, or no sizes.
pub fn load_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let document: CatalogDocument =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&document.products)?;

    tracing::debug!(
        path = %path.display(),
        products = document.products.len(),
        "catalog loaded"
    );

    Ok(document.products)
}

fn validate(products: &[Product]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for product in products {
        if product.id.as_str().is_empty() {
            return Err(CatalogError::InvalidEntry {
                id: String::new(),
                reason: "product id is empty".to_owned(),
            });
        }
        if !seen.insert(product.id.clone()) {
            return Err(CatalogError::InvalidEntry {
                id: product.id.to_string(),
                reason: "duplicate product id".to_owned(),
            });
        }
        if product.sizes.is_empty() {
            return Err(CatalogError::InvalidEntry {
                id: product.id.to_string(),
                reason: "sizes list is empty".to_owned(),
            });
        }
    }
    Ok(())
}
