//! Shopfront Core - Shared domain types and business rules.
//!
//! This crate provides the types used across all Shopfront components:
//! - `storefront` - The HTTP server (catalog, cart, checkout, orders, admin console)
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Database encodings are gated behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`checkout`] - Cart-to-order planning (selection filtering and totals)
//! - [`pagination`] - Page/limit handling shared by listing endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod pagination;
pub mod types;

pub use checkout::{CheckoutError, CheckoutLine, CheckoutPlan, plan_checkout};
pub use pagination::PageRequest;
pub use types::*;
