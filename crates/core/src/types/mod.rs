//! Core types for the FakeStore storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem, CartTotals};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{FieldError, Product, ProductDraft, ProductDraftError, Rating};
