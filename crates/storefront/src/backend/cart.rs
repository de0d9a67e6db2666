//! `/cart/` of the signed-in customer.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{
    AddToCart, BulkDelete, CartItem, CartItemId, ChangeVariant, Listing, SetQuantity,
};
use serde_json::Value;

pub async fn list(api: &ApiClient, token: AccessToken) -> Result<Listing<CartItem>, ApiError> {
    api.get("cart/", Some(&token)).await
}

pub async fn add(api: &ApiClient, token: AccessToken, body: &AddToCart) -> Result<Value, ApiError> {
    api.post("cart/", body, Some(&token)).await
}

pub async fn set_quantity(
    api: &ApiClient,
    token: AccessToken,
    id: CartItemId,
    quantity: i32,
) -> Result<Value, ApiError> {
    api.put(&format!("cart/{id}/"), &SetQuantity { quantity }, Some(&token))
        .await
}

pub async fn change_variant(
    api: &ApiClient,
    token: AccessToken,
    id: CartItemId,
    body: &ChangeVariant,
) -> Result<Value, ApiError> {
    api.patch(&format!("cart/{id}/"), body, Some(&token)).await
}

pub async fn remove(api: &ApiClient, token: AccessToken, id: CartItemId) -> Result<(), ApiError> {
    api.delete(&format!("cart/{id}/"), Some(&token)).await
}

pub async fn bulk_delete(
    api: &ApiClient,
    token: AccessToken,
    ids: &[CartItemId],
) -> Result<(), ApiError> {
    let body = BulkDelete {
        cart_item_ids: ids.to_vec(),
    };
    api.delete_with_body("cart/bulk-delete/", &body, Some(&token))
        .await
}
