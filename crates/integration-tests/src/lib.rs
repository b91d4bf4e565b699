//! Integration tests for Cotton Harbor.
//!
//! Exercises the store core end to end through the public API: catalog
//! load, cart mutations, order placement, and export round-trips on real
//! (temporary) directories.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cotton-harbor-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Catalog -> cart -> order -> invoice scenarios
//! - `export_concurrency` - Daily aggregate appends from parallel sessions

#![cfg_attr(not(test), forbid(unsafe_code))]
