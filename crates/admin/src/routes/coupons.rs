//! Coupon management and usage log.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{
    Coupon, CouponId, CouponInput, CouponUsage, CouponUsageFilter, PromotionType, format_datetime,
    to_datetime_local,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::instrument;

use super::{parse_amount, parse_opt, report};
use crate::backend;
use crate::components::data_table::coupons_table_config;
use crate::components::{DataTableConfig, PageContext};
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdminAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Layout of `<input type="datetime-local">`.
pub(crate) const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

pub(crate) fn parse_datetime_local(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_LOCAL).ok()
}

/// Discount type `<option>`.
#[derive(Debug, Clone)]
pub struct TypeOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub(crate) fn type_options() -> Vec<TypeOption> {
    PromotionType::ALL
        .iter()
        .map(|t| TypeOption {
            value: t.as_str(),
            label: t.label(),
        })
        .collect()
}

/// Coupon row, also used to prefill its edit form.
#[derive(Debug, Clone)]
pub struct CouponView {
    pub id: String,
    pub code: String,
    pub description: String,
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub value: String,
    pub value_label: String,
    pub min_order_amount: String,
    pub max_discount_amount: String,
    pub start_date: String,
    pub end_date: String,
    pub start_input: String,
    pub end_input: String,
    pub usage_limit_per_user: String,
    pub usage_limit_per_coupon: String,
    pub current_usage: i32,
    pub active: bool,
}

fn opt_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl From<&Coupon> for CouponView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            code: coupon.code.clone(),
            description: coupon.description.clone().unwrap_or_default(),
            kind: coupon.kind.as_str(),
            kind_label: coupon.kind.label(),
            value: opt_string(coupon.value),
            value_label: coupon.value_label(),
            min_order_amount: opt_string(coupon.min_order_amount.map(|v| v.amount())),
            max_discount_amount: opt_string(coupon.max_discount_amount.map(|v| v.amount())),
            start_date: format_datetime(&coupon.start_date),
            end_date: format_datetime(&coupon.end_date),
            start_input: to_datetime_local(&coupon.start_date),
            end_input: to_datetime_local(&coupon.end_date),
            usage_limit_per_user: opt_string(coupon.usage_limit_per_user),
            usage_limit_per_coupon: opt_string(coupon.usage_limit_per_coupon),
            current_usage: coupon.current_usage,
            active: coupon.is_active,
        }
    }
}

/// Usage log row.
#[derive(Debug, Clone)]
pub struct UsageView {
    pub coupon: String,
    pub user: String,
    pub user_id: String,
    pub order: String,
    pub order_id: String,
    pub used_at: String,
}

impl From<&CouponUsage> for UsageView {
    fn from(usage: &CouponUsage) -> Self {
        Self {
            coupon: usage.coupon_code.clone().unwrap_or_default(),
            user: usage.user_email.clone().unwrap_or_default(),
            user_id: opt_string(usage.user),
            order: usage.order_code.clone().unwrap_or_default(),
            order_id: opt_string(usage.order),
            used_at: usage.used_at.as_ref().map(format_datetime).unwrap_or_default(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "coupons/index.html")]
pub struct CouponsTemplate {
    pub ctx: PageContext,
    pub table: DataTableConfig,
    pub rows: Vec<CouponView>,
    pub types: Vec<TypeOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "coupons/usage.html")]
pub struct CouponUsageTemplate {
    pub ctx: PageContext,
    pub rows: Vec<UsageView>,
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CouponsQuery {
    pub search: Option<String>,
    pub is_active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub coupon_id: Option<String>,
    pub user_id: Option<String>,
    pub order_id: Option<String>,
}

/// Create and edit form.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub min_order_amount: Option<String>,
    #[serde(default)]
    pub max_discount_amount: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub usage_limit_per_user: Option<String>,
    #[serde(default)]
    pub usage_limit_per_coupon: Option<String>,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl CouponForm {
    /// Parse and validate into the API body, or the toast text to show.
    fn input(&self) -> std::result::Result<CouponInput, String> {
        let (Some(start_date), Some(end_date)) = (
            parse_datetime_local(&self.start_date),
            parse_datetime_local(&self.end_date),
        ) else {
            return Err("Please choose a start and end date".to_string());
        };
        let kind = self
            .kind
            .parse::<PromotionType>()
            .map_err(|_| "Please choose a coupon type".to_string())?;

        CouponInput {
            code: self.code.clone(),
            description: self.description.trim().to_string(),
            kind,
            value: parse_amount(self.value.as_deref()),
            min_order_amount: parse_amount(self.min_order_amount.as_deref()),
            max_discount_amount: parse_amount(self.max_discount_amount.as_deref()),
            start_date,
            end_date,
            usage_limit_per_user: parse_opt(self.usage_limit_per_user.as_deref()),
            usage_limit_per_coupon: parse_opt(self.usage_limit_per_coupon.as_deref()),
            is_active: self.is_active.is_some(),
        }
        .normalized()
        .map_err(|e| e.to_string())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(index).post(create))
        .route("/coupons/usage", get(usage))
        .route("/coupons/{id}", post(update))
        .route("/coupons/{id}/delete", post(delete))
}

#[instrument(skip(auth))]
async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<CouponsQuery>,
) -> Result<CouponsTemplate> {
    let search = query.search.unwrap_or_default();
    let is_active = query.is_active.unwrap_or_default();
    let term = Some(search.trim()).filter(|s| !s.is_empty());
    let active: Option<bool> = parse_opt(Some(is_active.as_str()));

    let coupons = auth
        .call(|t| backend::coupons::list(auth.api(), t, term, active))
        .await?;

    let params = [("search", search.clone()), ("is_active", is_active.clone())];
    Ok(CouponsTemplate {
        ctx: PageContext::new(&auth, "/coupons").await,
        table: coupons_table_config().with_values(&params),
        rows: coupons.items().iter().map(CouponView::from).collect(),
        types: type_options(),
    })
}

async fn rejected(auth: &AdminSession, message: String) -> Redirect {
    auth.flash(Flash::error(message)).await;
    Redirect::to("/coupons")
}

#[instrument(skip(auth, form))]
async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    Form(form): Form<CouponForm>,
) -> Result<Redirect> {
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&auth, message).await),
    };
    let result = auth
        .call(|t| backend::coupons::create(auth.api(), t, &input))
        .await;
    report(&auth, result, "Coupon created successfully", "Error creating coupon").await?;
    Ok(Redirect::to("/coupons"))
}

#[instrument(skip(auth, form))]
async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<CouponId>,
    Form(form): Form<CouponForm>,
) -> Result<Redirect> {
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&auth, message).await),
    };
    let result = auth
        .call(|t| backend::coupons::update(auth.api(), t, id, &input))
        .await;
    report(&auth, result, "Coupon updated successfully", "Error updating coupon").await?;
    Ok(Redirect::to("/coupons"))
}

#[instrument(skip(auth))]
async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<CouponId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::coupons::delete(auth.api(), t, id))
        .await;
    report(&auth, result, "Coupon deleted successfully", "Error deleting coupon").await?;
    Ok(Redirect::to("/coupons"))
}

#[instrument(skip(auth))]
async fn usage(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<UsageQuery>,
) -> Result<CouponUsageTemplate> {
    let filter = CouponUsageFilter {
        user_id: parse_opt(query.user_id.as_deref()),
        coupon_id: parse_opt(query.coupon_id.as_deref()),
        order_id: parse_opt(query.order_id.as_deref()),
    };
    let rows = auth
        .call(|t| backend::coupons::usage(auth.api(), t, &filter))
        .await?;

    Ok(CouponUsageTemplate {
        ctx: PageContext::new(&auth, "/coupons").await,
        rows: rows.items().iter().map(UsageView::from).collect(),
        coupon_id: opt_string(filter.coupon_id),
        user_id: opt_string(filter.user_id),
        order_id: opt_string(filter.order_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(code: &str, start: &str, end: &str) -> CouponForm {
        CouponForm {
            code: code.into(),
            description: "Spring".into(),
            kind: "percentage".into(),
            value: Some("10".into()),
            min_order_amount: Some("200.000".into()),
            max_discount_amount: Some(String::new()),
            start_date: start.into(),
            end_date: end.into(),
            usage_limit_per_user: Some("1".into()),
            usage_limit_per_coupon: None,
            is_active: Some("on".into()),
        }
    }

    #[test]
    fn test_coupon_form_normalizes_code() {
        let input = form(" spring10 ", "2025-03-01T00:00", "2025-03-31T23:59")
            .input()
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(input.code, "SPRING10");
        assert_eq!(input.min_order_amount, Some(200_000));
        assert_eq!(input.max_discount_amount, None);
        assert!(input.is_active);
    }

    #[test]
    fn test_coupon_form_rejects_inverted_window() {
        let err = form("X", "2025-03-31T00:00", "2025-03-01T00:00").input();
        assert_eq!(err.err().as_deref(), Some("End date cannot be before start date"));
    }

    #[test]
    fn test_coupon_form_requires_dates() {
        let err = form("X", "", "2025-03-01T00:00").input();
        assert_eq!(err.err().as_deref(), Some("Please choose a start and end date"));
    }
}
