//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready                 - Probes
//!
//! GET  /                                      - New arrivals and best sellers
//! GET  /catalogsearch?q=&cate=&sort=&page=    - Search and browse
//! GET  /collections                           - Category tree
//! GET  /productdetail/{slug}, POST            - Product page, add to cart
//!
//! GET  /cart                                  - Cart
//! POST /cart/{id}/quantity|variant|remove     - Line edits
//! POST /cart/remove-selected                  - Bulk delete
//! POST /cart/checkout                         - Selected lines → checkout
//!
//! GET  /checkout?items=&coupon=&code=, POST  - Quote and place order
//! GET  /payment                               - Gateway return page
//!
//! GET  /account/order?type=                   - Order history by status
//! GET  /account/order/{id}                    - Order detail
//! POST /account/order/{id}/cancel
//!
//! GET  /account/delivery-address, POST        - Address book, create
//! POST /account/delivery-address/{id}         - Update
//! POST /account/delivery-address/{id}/delete|default
//!
//! GET  /api/provinces                         - Address pickers (JSON)
//! GET  /api/provinces/{id}/districts
//! GET  /api/districts/{id}/wards
//!
//! GET  /login, POST                           - Sign in (rate limited)
//! POST /logout
//! GET  /signup, POST                          - Register (rate limited)
//! POST /signup/verify                         - Email OTP (rate limited)
//! GET  /account/recover-password, POST        - Three-step reset (rate limited)
//! ```

use std::str::FromStr;

use axum::Router;
use boutique_core::client::ApiError;
use tracing::warn;

use crate::error::AppError;
use crate::middleware::CustomerSession;
use crate::models::Flash;
use crate::state::AppState;

pub mod account;
pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod home;
pub mod locations;
pub mod product;

/// All storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(home::router())
        .merge(catalog::router())
        .merge(product::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(account::router())
        .merge(addresses::router())
        .merge(locations::router())
        .merge(auth::router())
}

// =============================================================================
// Mutation outcome helpers
// =============================================================================

/// Toast text for a failed mutation: the backend's validation message for a
/// 4xx, otherwise the page's generic failure text.
fn failure_message(fallback: &str, err: &ApiError) -> String {
    match err {
        ApiError::Api { status, message } if (400..500).contains(status) && !message.is_empty() => {
            message.clone()
        }
        _ => fallback.to_string(),
    }
}

/// Report a mutation outcome as a toast.
///
/// Commerce API failures become an error toast and the caller redirects as
/// usual; an expired session and local failures still propagate.
pub(crate) async fn report<T>(
    auth: &CustomerSession,
    result: Result<T, AppError>,
    success: &str,
    failure: &str,
) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => {
            auth.flash(Flash::success(success)).await;
            Ok(Some(value))
        }
        Err(AppError::Api(ApiError::Unauthorized)) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(AppError::Api(err)) => {
            warn!(error = %err, "{failure}");
            auth.flash(Flash::error(failure_message(failure, &err))).await;
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

// =============================================================================
// Form helpers
// =============================================================================

/// Parse an optional form value; blank or malformed input is `None`.
pub(crate) fn parse_opt<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Every parseable value of a repeated form field (`name=1&name=2`).
///
/// `axum::Form` keeps only one value per key, so checkbox lists are read
/// from the raw body.
pub(crate) fn repeated<T: FromStr>(body: &[u8], name: &str) -> Vec<T> {
    url::form_urlencoded::parse(body)
        .filter(|(key, _)| key == name)
        .filter_map(|(_, value)| parse_opt(Some(&value)))
        .collect()
}

/// Parse a comma-separated id list from a query string (`items=3,5`).
pub(crate) fn id_list<T: FromStr>(value: Option<&str>) -> Vec<T> {
    value
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| parse_opt(Some(part)))
        .collect()
}

/// Join ids for a query string.
pub(crate) fn join_ids<T: ToString>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Only same-site relative paths are followed after login.
pub(crate) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use boutique_core::CartItemId;

    use super::*;

    #[test]
    fn test_failure_message_prefers_validation_text() {
        let validation = ApiError::Api {
            status: 400,
            message: "Not enough stock for this variant.".into(),
        };
        assert_eq!(
            failure_message("Failed to add product to cart.", &validation),
            "Not enough stock for this variant."
        );
        let outage = ApiError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(
            failure_message("Failed to add product to cart.", &outage),
            "Failed to add product to cart."
        );
    }

    #[test]
    fn test_repeated_checkbox_values() {
        let ids: Vec<CartItemId> = repeated(b"item_ids=3&item_ids=x&note=hi&item_ids=5", "item_ids");
        assert_eq!(ids, vec![CartItemId::new(3), CartItemId::new(5)]);
    }

    #[test]
    fn test_id_list_round_trip() {
        let ids: Vec<CartItemId> = id_list(Some("3, 5,,abc"));
        assert_eq!(join_ids(&ids), "3,5");
        assert!(id_list::<CartItemId>(None).is_empty());
    }

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/cart")), "/cart");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
