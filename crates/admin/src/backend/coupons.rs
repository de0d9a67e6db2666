//! `/coupons/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Coupon, CouponId, CouponInput, CouponUsage, CouponUsageFilter, Listing};

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    search: Option<&str>,
    is_active: Option<bool>,
) -> Result<Listing<Coupon>, ApiError> {
    let mut params = Vec::new();
    if let Some(search) = search {
        params.push(("search", search.to_string()));
    }
    if let Some(active) = is_active {
        params.push(("is_active", active.to_string()));
    }
    api.get_query("coupons/", &params, Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    input: &CouponInput,
) -> Result<Coupon, ApiError> {
    api.post("coupons/", input, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: CouponId,
    input: &CouponInput,
) -> Result<Coupon, ApiError> {
    api.put(&format!("coupons/{id}/"), input, Some(&token)).await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: CouponId) -> Result<(), ApiError> {
    api.delete(&format!("coupons/{id}/"), Some(&token)).await
}

pub async fn usage(
    api: &ApiClient,
    token: AccessToken,
    filter: &CouponUsageFilter,
) -> Result<Listing<CouponUsage>, ApiError> {
    api.get_query("coupons/usage/", &filter.query_pairs(), Some(&token))
        .await
}
