//! REST resources exchanged with the commerce API.
//!
//! Field names match the wire format. Read-side structs are lenient
//! (`#[serde(default)]` on everything the backend may omit); write-side
//! `*Input` structs carry only what the endpoint accepts.

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod geo;
pub mod marketing;
pub mod orders;
pub mod payment;
pub mod users;

pub use address::*;
pub use auth::*;
pub use cart::*;
pub use catalog::*;
pub use geo::*;
pub use marketing::*;
pub use orders::*;
pub use payment::*;
pub use users::*;

use serde::{Deserialize, Serialize};

/// A list response.
///
/// Endpoints backed by plain views answer with a bare array; paginated ones
/// answer with a page object. Both deserialize into a `Listing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    /// Total number of records, across pages when the response was paginated.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Page { count, .. } => *count,
            Self::Items(items) => items.len() as u64,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        matches!(self, Self::Page { next: Some(_), .. })
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Page { results, .. } => results,
            Self::Items(items) => items,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Page { results, .. } => results,
            Self::Items(items) => items,
        }
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    #[derive(Debug, Deserialize)]
    struct Row {
        id: CategoryId,
    }

    #[test]
    fn test_listing_accepts_bare_array() {
        let listing: Listing<Row> = serde_json::from_str(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(listing.total(), 2);
        assert!(!listing.has_next());
        assert_eq!(listing.items().first().map(|r| r.id), Some(CategoryId::new(1)));
    }

    #[test]
    fn test_listing_accepts_page_object() {
        let json = r#"{"count": 45, "next": "http://api/products/?page=2", "previous": null,
            "results": [{"id": 9}]}"#;
        let listing: Listing<Row> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.total(), 45);
        assert!(listing.has_next());
        assert_eq!(listing.into_items().len(), 1);
    }
}
