//! FakeStore Core - Shared types library.
//!
//! This crate provides the domain types used across all FakeStore components:
//! - `storefront` - Catalog client, cart store, and cart session
//! - `cli` - Command-line storefront for browsing, admin CRUD, and the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no
//! persistence, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products, carts, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
