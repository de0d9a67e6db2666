//! Shipping records of a user.
//!
//! The backend spells the collection `shipping-info` for creates and
//! `shipping_info` for reads and updates.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Listing, ShippingInfo, ShippingInfoId, ShippingInfoInput, UserId};

pub async fn for_user(
    api: &ApiClient,
    token: AccessToken,
    user: UserId,
) -> Result<Listing<ShippingInfo>, ApiError> {
    api.get(&format!("shipping_info/{user}/"), Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    input: &ShippingInfoInput,
) -> Result<ShippingInfo, ApiError> {
    api.post("shipping-info/", input, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: ShippingInfoId,
    input: &ShippingInfoInput,
) -> Result<ShippingInfo, ApiError> {
    api.put(&format!("shipping_info/{id}"), input, Some(&token))
        .await
}
