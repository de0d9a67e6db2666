//! Core types for Boutique.
//!
//! Type-safe IDs, dong amounts, status enums and the display helpers shared by
//! both applications.

pub mod display;
pub mod id;
pub mod money;
pub mod sort;
pub mod status;

pub use display::*;
pub use id::*;
pub use money::{Vnd, format_vnd_str};
pub use sort::CatalogSort;
pub use status::*;
