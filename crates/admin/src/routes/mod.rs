//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready           - Probes
//!
//! GET  /auth/login, POST /auth/login    - Staff login against the commerce API
//! POST /auth/logout                     - Logout
//!
//! GET  /                                - Dashboard
//!
//! GET  /products                        - Product grid
//! GET  /products/add, POST              - Create product (inline supplier create)
//! GET  /products/{id}, POST             - Detail, variants, update
//! POST /products/{id}/delete
//! POST /products/{id}/variants          - Add variant
//! POST /variants/{id}/delete
//!
//! GET  /categories, POST                - Category list, create
//! GET  /categories/{id}, POST           - Edit
//! POST /categories/{id}/delete
//!
//! GET  /orders                          - Order grid (status, dates, pagination)
//! GET  /orders/{id}                     - Detail, items, history
//! POST /orders/{id}/process|cancel|delete
//! POST /orders/{id}/note
//! POST /orders/{id}/shipping-info       - Edit the customer's shipping info
//!
//! GET  /users, GET /users/{id}          - Users, detail with shipping info
//! POST /users/{id}/delete
//! POST /users/{id}/shipping-info        - Create or update shipping info
//!
//! GET  /coupons, POST                   - Coupons, create
//! POST /coupons/{id}, /coupons/{id}/delete
//! GET  /coupons/usage                   - Usage log
//!
//! GET  /sales, POST                     - Sales, create
//! GET  /sales/{id}, POST                - Edit
//! GET  /sales/{id}/products, POST       - Assign or remove products and categories
//! POST /sales/{id}/delete
//!
//! GET  /api/geo/provinces               - Geography pickers (JSON)
//! GET  /api/geo/provinces/{code}/districts
//! GET  /api/geo/districts/{code}/wards
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use axum::Router;
use axum::extract::Multipart;
use boutique_core::client::{ApiError, FileUpload};
use tracing::warn;

use crate::error::AppError;
use crate::middleware::AdminSession;
use crate::models::Flash;
use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod coupons;
pub mod dashboard;
pub mod geo;
pub mod health;
pub mod orders;
pub mod products;
pub mod sales;
pub mod users;

/// All admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(coupons::router())
        .merge(sales::router())
        .merge(geo::router())
}

// =============================================================================
// Mutation outcome helpers
// =============================================================================

/// Toast text for a failed mutation: the backend's validation message for a
/// 4xx, otherwise the screen's generic failure text.
fn failure_message(fallback: &str, err: &ApiError) -> String {
    match err {
        ApiError::Api { status, message } if (400..500).contains(status) => message.clone(),
        _ => fallback.to_string(),
    }
}

/// Report a mutation outcome as a toast.
///
/// Commerce API failures become an error toast and the caller redirects as
/// usual; an expired session and local failures still propagate.
pub(crate) async fn report<T>(
    auth: &AdminSession,
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

/// Parse a whole-dong amount typed with or without `.`/`,` separators.
pub(crate) fn parse_amount(value: Option<&str>) -> Option<i64> {
    let digits: String = value?
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' ' | 'đ'))
        .collect();
    parse_opt(Some(&digits))
}

/// Text fields and the uploaded file of a multipart form.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<FileUpload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().trim().to_string()
    }

    /// Read every part. The first non-empty file part named `file_field` is
    /// forwarded to the commerce API as `upload_as`.
    pub async fn read(
        mut multipart: Multipart,
        file_field: &str,
        upload_as: &'static str,
    ) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() && !file_name.is_empty() {
                    form.file = Some(FileUpload {
                        field: upload_as,
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_prefers_validation_text() {
        let validation = ApiError::Api {
            status: 400,
            message: "sku: variant with this sku already exists.".into(),
        };
        assert_eq!(
            failure_message("Error creating product", &validation),
            "sku: variant with this sku already exists."
        );
        let outage = ApiError::Api {
            status: 503,
            message: "upstream".into(),
        };
        assert_eq!(
            failure_message("Error creating product", &outage),
            "Error creating product"
        );
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_opt::<i32>(Some(" 7 ")), Some(7));
        assert_eq!(parse_opt::<i32>(Some("")), None);
        assert_eq!(parse_opt::<i32>(None), None);
        assert_eq!(parse_amount(Some("1.250.000")), Some(1_250_000));
    }
}
