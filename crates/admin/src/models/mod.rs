//! Session models for admin.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashLevel, StoredLogin, keys as session_keys};
