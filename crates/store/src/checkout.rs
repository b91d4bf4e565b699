//! Order placement.
//!
//! Checkout turns a cart plus customer contact details into an immutable
//! [`Order`]: a fresh order ID, a timestamp, a by-value snapshot of the
//! cart lines, and a total computed once over that snapshot. Placing an
//! order does not touch the cart; clearing it is the caller's decision,
//! taken only after the exported invoice is confirmed written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cotton_harbor_core::OrderId;

use crate::cart::{Cart, CartLine};

/// Customer contact and delivery details collected at checkout.
///
/// All fields are required; whitespace-only input counts as missing.
/// Details are stored on the order they were collected for and nowhere
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Delivery address.
    pub address: String,
}

impl CustomerDetails {
    /// Create customer details from raw form input.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Returns a copy with every field trimmed of surrounding whitespace.
    #[must_use]
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
        }
    }

    /// Fields that are empty after trimming, in declaration order.
    fn missing_fields(&self) -> Vec<CustomerField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(CustomerField::Name);
        }
        if self.phone.trim().is_empty() {
            missing.push(CustomerField::Phone);
        }
        if self.address.trim().is_empty() {
            missing.push(CustomerField::Address);
        }
        missing
    }
}

/// A customer detail field, used to name what is missing at validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Name,
    Phone,
    Address,
}

impl std::fmt::Display for CustomerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Phone => write!(f, "phone"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// Errors that can occur when placing an order.
///
/// Both variants are user-correctable: the message is surfaced verbatim
/// and the operation retried after the user fixes their input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The cart has no lines.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// One or more customer fields are empty after trimming.
    #[error("customer information is incomplete: missing {}", join_fields(.missing))]
    IncompleteCustomerInfo {
        /// The fields that were missing, in declaration order.
        missing: Vec<CustomerField>,
    },
}

fn join_fields(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An order, immutable once created.
///
/// Fields are private and exposed through accessors only; there is no way
/// to mutate an order after [`place_order`] returns. The line items are a
/// snapshot by value, so later cart mutation cannot alter them, and the
/// total is computed exactly once over that snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    placed_at: DateTime<Utc>,
    customer: CustomerDetails,
    lines: Vec<CartLine>,
    total: Decimal,
}

impl Order {
    /// The order's unique ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// When the order was placed.
    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// The customer the order was placed for.
    #[must_use]
    pub const fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// The snapshot of cart lines the order was placed with.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The order total, computed once at placement.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }
}

/// Place an order for the cart's current contents.
///
/// Generates a unique order ID, stamps the current time, snapshots the
/// cart lines by value, and computes the total over the snapshot. The
/// cart itself is not modified.
///
/// # Errors
///
/// Returns [`OrderError::EmptyCart`] if the cart has no lines, and
/// [`OrderError::IncompleteCustomerInfo`] naming every field that is
/// empty after trimming.
pub fn place_order(cart: &Cart, customer: &CustomerDetails) -> Result<Order, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let missing = customer.missing_fields();
    if !missing.is_empty() {
        return Err(OrderError::IncompleteCustomerInfo { missing });
    }

    let order = Order {
        id: OrderId::generate(),
        placed_at: Utc::now(),
        customer: customer.trimmed(),
        lines: cart.lines().to_vec(),
        total: cart.total(),
    };

    tracing::info!(
        order_id = %order.id,
        lines = order.lines.len(),
        total = %order.total,
        "order placed"
    );

    Ok(order)
}
