//! Core types for Shopkeeper.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod shop_domain;

pub use email::{Email, EmailError};
pub use id::*;
pub use shop_domain::{ShopDomain, ShopDomainError};
