//! Store facade.
//!
//! [`Store`] ties the loaded catalog and the order exporter together for
//! presentation layers that want the documented checkout flow in one
//! call: place the order, export it, and clear the cart only once the
//! export is confirmed written.

use std::path::PathBuf;

use cotton_harbor_core::ProductId;

use crate::cart::Cart;
use crate::catalog::{Product, load_catalog};
use crate::checkout::{CustomerDetails, Order, OrderError, place_order};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::export::{ExportError, OrderExporter};

/// The outcome of a successful checkout.
///
/// The order always stands once placed; the invoice artifact may
/// independently have failed to write. Callers surface the two outcomes
/// distinctly: a missing invoice does not unwind the order.
#[derive(Debug)]
pub struct Receipt {
    /// The placed order.
    pub order: Order,
    /// Where the invoice was written, or why it was not.
    pub invoice: std::result::Result<PathBuf, ExportError>,
}

/// A loaded store: the product catalog plus an order exporter.
///
/// The store holds no cart; carts are session values owned by the
/// presentation layer and passed into each operation.
#[derive(Debug)]
pub struct Store {
    catalog: Vec<Product>,
    exporter: OrderExporter,
}

impl Store {
    /// Open the store described by `config`.
    ///
    /// Loads the catalog once and prepares the orders directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Catalog`] if the catalog document is missing
    /// or invalid, and [`StoreError::Export`] if the orders directory
    /// cannot be created.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let catalog = load_catalog(&config.catalog_path)?;
        let exporter = OrderExporter::new(&config.orders_dir, config.export_mode)?;
        Ok(Self { catalog, exporter })
    }

    /// All products, in catalog declaration order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.catalog
    }

    /// Look up one product by ID.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.iter().find(|product| &product.id == id)
    }

    /// The order exporter, for admin bulk download.
    #[must_use]
    pub const fn exporter(&self) -> &OrderExporter {
        &self.exporter
    }

    /// Place an order for the cart and export it.
    ///
    /// On success the cart is cleared only if the invoice was written;
    /// when the export fails the cart is left intact, the order stands,
    /// and the missing artifact is reported in [`Receipt::invoice`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] when validation rejects the cart or the
    /// customer details; nothing is exported and the cart is unchanged.
    pub fn checkout(
        &self,
        cart: &mut Cart,
        customer: &CustomerDetails,
    ) -> Result<Receipt, OrderError> {
        let order = place_order(cart, customer)?;

        let invoice = self.exporter.export_order(&order);
        match &invoice {
            Ok(_) => cart.clear(),
            Err(err) => {
                tracing::warn!(
                    order_id = %order.id(),
                    error = %err,
                    "order placed but invoice export failed"
                );
            }
        }

        Ok(Receipt { order, invoice })
    }
}
