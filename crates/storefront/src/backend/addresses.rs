//! `/delivery-addresses/` of the signed-in customer.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{AddressId, AddressInput, DeliveryAddress, Listing};
use serde_json::Value;

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<DeliveryAddress>, ApiError> {
    api.get("delivery-addresses/", Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    input: &AddressInput,
) -> Result<DeliveryAddress, ApiError> {
    api.post("delivery-addresses/", input, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: AddressId,
    input: &AddressInput,
) -> Result<DeliveryAddress, ApiError> {
    api.put(&format!("delivery-addresses/{id}/"), input, Some(&token))
        .await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: AddressId) -> Result<(), ApiError> {
    api.delete(&format!("delivery-addresses/{id}/"), Some(&token))
        .await
}

pub async fn set_default(
    api: &ApiClient,
    token: AccessToken,
    id: AddressId,
) -> Result<Value, ApiError> {
    api.post(
        &format!("delivery-addresses/{id}/set-default/"),
        &serde_json::json!({}),
        Some(&token),
    )
    .await
}
