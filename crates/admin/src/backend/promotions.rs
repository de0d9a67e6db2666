//! `/promotions/` (sales).

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Listing, Promotion, PromotionAssignment, PromotionId, PromotionInput};
use serde_json::Value;

pub async fn list(api: &ApiClient, token: AccessToken) -> Result<Listing<Promotion>, ApiError> {
    api.get("promotions/", Some(&token)).await
}

pub async fn get(
    api: &ApiClient,
    token: AccessToken,
    id: PromotionId,
) -> Result<Promotion, ApiError> {
    api.get(&format!("promotions/{id}/"), Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    input: &PromotionInput,
) -> Result<Promotion, ApiError> {
    api.post("promotions/", input, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: PromotionId,
    input: &PromotionInput,
) -> Result<Promotion, ApiError> {
    api.put(&format!("promotions/{id}/"), input, Some(&token))
        .await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: PromotionId) -> Result<(), ApiError> {
    api.delete(&format!("promotions/{id}/"), Some(&token)).await
}

/// Attach products and categories to a sale.
pub async fn assign(
    api: &ApiClient,
    token: AccessToken,
    body: &PromotionAssignment,
) -> Result<Value, ApiError> {
    api.post("promotions/assign/", body, Some(&token)).await
}

/// Detach products and categories from a sale.
pub async fn remove(
    api: &ApiClient,
    token: AccessToken,
    body: &PromotionAssignment,
) -> Result<(), ApiError> {
    api.delete_with_body("promotions/remove/", body, Some(&token))
        .await
}
