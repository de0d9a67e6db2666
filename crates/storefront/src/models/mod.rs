//! Session models for the storefront.

pub mod session;

pub use session::{CurrentCustomer, Flash, FlashLevel, StoredLogin, keys as session_keys};
