//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login (Argon2id)
//! - `catalog` - Product reads and writes with a per-product cache
//! - `media` - Signed uploads to a Cloudinary-compatible image host
//! - `payment` - Simulated payment gateway

pub mod auth;
pub mod catalog;
pub mod media;
pub mod payment;

pub use catalog::Catalog;
pub use media::MediaClient;
pub use payment::PaymentGateway;
