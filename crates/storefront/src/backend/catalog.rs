//! Public catalog reads: `/products/` and `/categories/`.

use boutique_core::client::{ApiClient, ApiError};
use boutique_core::{Category, Listing, Product, ProductFilter, Variant};

/// Newest products first.
pub async fn latest(api: &ApiClient, limit: u32) -> Result<Listing<Product>, ApiError> {
    let filter = ProductFilter {
        latest: true,
        limit: Some(limit),
        ..ProductFilter::default()
    };
    search(api, &filter).await
}

pub async fn best_sellers(api: &ApiClient, limit: u32) -> Result<Listing<Product>, ApiError> {
    api.get_query(
        "products/best-sellers/",
        &[("limit", limit.to_string())],
        None,
    )
    .await
}

pub async fn search(api: &ApiClient, filter: &ProductFilter) -> Result<Listing<Product>, ApiError> {
    api.get_query("products/", &filter.query_pairs(), None).await
}

pub async fn product(api: &ApiClient, slug: &str) -> Result<Product, ApiError> {
    api.get(&format!("products/{}/", urlencoding::encode(slug)), None)
        .await
}

pub async fn variants(api: &ApiClient, slug: &str) -> Result<Listing<Variant>, ApiError> {
    api.get(
        &format!("products/{}/variants/", urlencoding::encode(slug)),
        None,
    )
    .await
}

pub async fn product_categories(
    api: &ApiClient,
    slug: &str,
) -> Result<Listing<Category>, ApiError> {
    api.get(
        &format!("products/{}/categories/", urlencoding::encode(slug)),
        None,
    )
    .await
}

pub async fn categories(api: &ApiClient) -> Result<Listing<Category>, ApiError> {
    api.get("categories/", None).await
}
