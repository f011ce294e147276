//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types in
//! [`crate::db`]. Everything that crosses the HTTP boundary serializes with
//! camelCase field names.

pub mod cart;
pub mod order;
pub mod page;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem};
pub use page::{OrderPage, ProductPage};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate, SortOrder};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
