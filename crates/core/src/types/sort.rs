//! Catalog sort options.

use serde::{Deserialize, Serialize};

/// Sort order offered on the catalog search page.
///
/// Each option maps onto the `sort_by`/`sort_value` query parameters of
/// `GET /products/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    PriceAsc,
    PriceDesc,
    #[default]
    NameAsc,
    NameDesc,
    Newest,
    Oldest,
}

impl CatalogSort {
    /// All options in menu order.
    pub const ALL: [Self; 6] = [
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
        Self::Newest,
        Self::Oldest,
    ];

    /// Value used in the storefront's `sort` query parameter.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::NameAsc => "Name: A-Z",
            Self::NameDesc => "Name: Z-A",
            Self::Newest => "Newest",
            Self::Oldest => "Oldest",
        }
    }

    /// `(sort_by, sort_value)` pair sent to the commerce API.
    #[must_use]
    pub const fn api_params(self) -> (&'static str, &'static str) {
        match self {
            Self::PriceAsc => ("price", "asc"),
            Self::PriceDesc => ("price", "desc"),
            Self::NameAsc => ("name", "asc"),
            Self::NameDesc => ("name", "desc"),
            Self::Newest => ("date", "desc"),
            Self::Oldest => ("date", "asc"),
        }
    }

    /// Parse a `sort` query value; unknown or missing values fall back to the default.
    #[must_use]
    pub fn from_key(key: Option<&str>) -> Self {
        key.and_then(|k| Self::ALL.into_iter().find(|s| s.key() == k))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_params() {
        assert_eq!(CatalogSort::PriceAsc.api_params(), ("price", "asc"));
        assert_eq!(CatalogSort::PriceDesc.api_params(), ("price", "desc"));
        assert_eq!(CatalogSort::NameDesc.api_params(), ("name", "desc"));
        assert_eq!(CatalogSort::Newest.api_params(), ("date", "desc"));
        assert_eq!(CatalogSort::Oldest.api_params(), ("date", "asc"));
    }

    #[test]
    fn test_default_is_name_ascending() {
        assert_eq!(CatalogSort::from_key(None).api_params(), ("name", "asc"));
        assert_eq!(CatalogSort::from_key(Some("bogus")), CatalogSort::NameAsc);
        assert_eq!(CatalogSort::from_key(Some("newest")), CatalogSort::Newest);
    }
}
