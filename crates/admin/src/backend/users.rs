//! `/users/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Listing, User, UserId};

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    search: Option<&str>,
    page: Option<u32>,
) -> Result<Listing<User>, ApiError> {
    let mut params = Vec::new();
    if let Some(search) = search {
        params.push(("search", search.to_string()));
    }
    if let Some(page) = page.filter(|p| *p > 1) {
        params.push(("page", page.to_string()));
    }
    api.get_query("users/", &params, Some(&token)).await
}

pub async fn get(api: &ApiClient, token: AccessToken, id: UserId) -> Result<User, ApiError> {
    api.get(&format!("users/{id}/"), Some(&token)).await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: UserId) -> Result<(), ApiError> {
    api.delete(&format!("users/{id}/"), Some(&token)).await
}
