//! FakeStore Storefront library.
//!
//! The storefront is a thin layer over the public FakeStore REST API plus a
//! client-side cart:
//!
//! - [`catalog`] - HTTP client for products and categories (read and admin CRUD)
//! - [`cart`] - persisted cart, totals, and the live cart session
//! - [`auth`] - placeholder sign-in that selects the guest or user cart
//! - [`config`] - environment-driven configuration
//! - [`error`] - unified error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;

pub use error::{Result, StorefrontError};
