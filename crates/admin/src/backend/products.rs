//! `/products/` and `/variants/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError, MultipartBody};
use boutique_core::{Listing, Product, ProductFilter, ProductId, Variant, VariantId};

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    filter: &ProductFilter,
) -> Result<Listing<Product>, ApiError> {
    api.get_query("products/", &filter.query_pairs(), Some(&token))
        .await
}

pub async fn get(api: &ApiClient, token: AccessToken, id: ProductId) -> Result<Product, ApiError> {
    api.get(&format!("products/{id}/"), Some(&token)).await
}

/// `POST /products/` with the form fields and optional `image_url` file.
pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    body: &MultipartBody,
) -> Result<Product, ApiError> {
    api.post_multipart("products/", body, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: ProductId,
    body: &MultipartBody,
) -> Result<Product, ApiError> {
    api.patch_multipart(&format!("products/{id}/"), body, Some(&token))
        .await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: ProductId) -> Result<(), ApiError> {
    api.delete(&format!("products/{id}/"), Some(&token)).await
}

pub async fn variants(
    api: &ApiClient,
    token: AccessToken,
    id: ProductId,
) -> Result<Listing<Variant>, ApiError> {
    api.get(&format!("products/{id}/variants/"), Some(&token))
        .await
}

pub async fn create_variant(
    api: &ApiClient,
    token: AccessToken,
    product: ProductId,
    body: &MultipartBody,
) -> Result<Variant, ApiError> {
    api.post_multipart(&format!("products/{product}/variants/"), body, Some(&token))
        .await
}

pub async fn delete_variant(
    api: &ApiClient,
    token: AccessToken,
    id: VariantId,
) -> Result<(), ApiError> {
    api.delete(&format!("variants/{id}/"), Some(&token)).await
}
