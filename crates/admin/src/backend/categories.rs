//! `/categories/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Category, CategoryId, CategoryInput, Listing};

/// Category tree; `search` narrows it by name.
pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    search: Option<&str>,
) -> Result<Listing<Category>, ApiError> {
    let params: Vec<(&str, String)> = search
        .map(|s| vec![("search", s.to_string())])
        .unwrap_or_default();
    api.get_query("categories/", &params, Some(&token)).await
}

pub async fn get(api: &ApiClient, token: AccessToken, id: CategoryId) -> Result<Category, ApiError> {
    api.get(&format!("categories/{id}/"), Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    input: &CategoryInput,
) -> Result<Category, ApiError> {
    api.post("categories/", input, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: CategoryId,
    input: &CategoryInput,
) -> Result<Category, ApiError> {
    api.put(&format!("categories/{id}/"), input, Some(&token))
        .await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: CategoryId) -> Result<(), ApiError> {
    api.delete(&format!("categories/{id}/"), Some(&token)).await
}
