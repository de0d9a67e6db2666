//! Reference lists used at checkout: shipping, delivery and payment methods,
//! and coupons.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Coupon, CouponValidation, DeliveryMethod, Listing, PaymentMethod, ShippingMethod};
use serde::Serialize;

#[derive(Serialize)]
struct CouponCode<'a> {
    code: &'a str,
}

pub async fn shipping_methods(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<ShippingMethod>, ApiError> {
    api.get("shipping-methods/", Some(&token)).await
}

pub async fn delivery_methods(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<DeliveryMethod>, ApiError> {
    api.get("delivery-methods/", Some(&token)).await
}

pub async fn payment_methods(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<PaymentMethod>, ApiError> {
    api.get("payment-methods/", Some(&token)).await
}

pub async fn coupons(api: &ApiClient, token: AccessToken) -> Result<Listing<Coupon>, ApiError> {
    api.get("coupons/", Some(&token)).await
}

/// Check a typed coupon code. An unknown code answers `is_valid: false`
/// rather than an error.
pub async fn validate_coupon(
    api: &ApiClient,
    token: AccessToken,
    code: &str,
) -> Result<CouponValidation, ApiError> {
    api.post(
        "coupons/validate/",
        &CouponCode { code: code.trim() },
        Some(&token),
    )
    .await
}
