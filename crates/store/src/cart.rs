//! Session-scoped shopping cart.
//!
//! A [`Cart`] is a plain value owned by the caller (typically one per user
//! session) and passed by reference into every operation. The core keeps
//! no ambient cart state of its own, so two sessions never share lines and
//! no locking is needed within a session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cotton_harbor_core::{Price, ProductId};

use crate::catalog::Product;

/// Errors that can occur when mutating a [`Cart`].
///
/// Both variants signal caller state that is out of step with the cart
/// (a stale size choice or a cached index); the operation leaves the cart
/// unchanged and the caller re-prompts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The chosen size is not offered for the product.
    #[error("size {size:?} is not offered for product {product}")]
    InvalidSize {
        /// Product the size was requested for.
        product: ProductId,
        /// The rejected size.
        size: String,
    },

    /// The line index does not exist.
    #[error("no cart line at index {index} (cart has {len} lines)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of lines in the cart at the time of the call.
        len: usize,
    },
}

/// One entry in a cart: a chosen product, size, and quantity.
///
/// Name and price are copied from the product at add time and not
/// re-derived later, so a catalog change never alters a cart in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// ID of the product this line was created from.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Unit price at add time.
    pub price: Price,
    /// Chosen size. Always one of the product's declared sizes.
    pub size: String,
    /// Quantity. Never below 1.
    pub quantity: u32,
}

impl CartLine {
    /// Returns `price * quantity` for this line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// An ordered sequence of cart lines scoped to one user session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new line for `product` in the chosen size.
    ///
    /// Always appends: adding the same product and size twice yields two
    /// distinct lines rather than one line with a higher quantity. A
    /// quantity of 0 is treated as 1. Returns the new line's index.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidSize`] if `size` is not one of the
    /// product's declared sizes; the cart is left unchanged.
    pub fn add_item(
        &mut self,
        product: &Product,
        size: &str,
        quantity: u32,
    ) -> Result<usize, CartError> {
        if !product.sizes.iter().any(|s| s == size) {
            return Err(CartError::InvalidSize {
                product: product.id.clone(),
                size: size.to_owned(),
            });
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            size: size.to_owned(),
            quantity: quantity.max(1),
        });

        let index = self.lines.len() - 1;
        tracing::debug!(product = %product.id, size, index, "cart line added");
        Ok(index)
    }

    /// Increase the quantity of the line at `index` by one.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn increment_quantity(&mut self, index: usize) -> Result<u32, CartError> {
        let line = self.line_mut(index)?;
        line.quantity += 1;
        Ok(line.quantity)
    }

    /// Decrease the quantity of the line at `index` by one, floored at 1.
    ///
    /// Decrementing a line already at quantity 1 is a no-op, not a removal;
    /// use [`Cart::remove_item`] to delete a line. Returns the quantity
    /// after the call.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn decrement_quantity(&mut self, index: usize) -> Result<u32, CartError> {
        let line = self.line_mut(index)?;
        if line.quantity > 1 {
            line.quantity -= 1;
        }
        Ok(line.quantity)
    }

    /// Delete the line at `index` and return it.
    ///
    /// Subsequent lines shift down, so callers must not cache indices
    /// across a removal.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    pub fn remove_item(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        let line = self.lines.remove(index);
        tracing::debug!(product = %line.product_id, index, "cart line removed");
        Ok(line)
    }

    /// Sum of `price * quantity` over all lines. Zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The cart's lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut CartLine, CartError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })
    }
}
