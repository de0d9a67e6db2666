//! Shared presentational pieces for storefront pages.

pub mod layout;
pub mod product_card;

pub use layout::{CustomerView, PageContext};
pub use product_card::ProductCard;
