//! Cotton Harbor Core - Shared types library.
//!
//! This crate provides common types used across all Cotton Harbor components:
//! - `store` - The storefront core (catalog, cart, checkout, export)
//! - the presentation layer embedding the store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no file access, no
//! framework dependencies. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
