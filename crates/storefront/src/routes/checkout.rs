//! Checkout and the payment gateway return page.
//!
//! The cart page hands over the selected lines as `?items=3,5`. Coupons are
//! chosen in two slots: one free-shipping coupon and one discount (fixed or
//! percentage); picking a coupon replaces whatever held its slot. The
//! selection travels as `?coupon=1,3`, and a typed code as `?code=`.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use boutique_core::client::ApiError;
use boutique_core::{
    AddressId, CartItem, CartItemId, Coupon, CouponId, DeliveryMethod, NewOrder, OrderQuote,
    PaymentMethodId, PromotionType, QuoteRequest,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::cart::selected_total;
use super::{id_list, join_ids, parse_opt, report};
use crate::backend;
use crate::components::PageContext;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CustomerSession, RequireAuth};
use crate::models::Flash;
use crate::state::AppState;

// =============================================================================
// Coupon selection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CouponSlot {
    Shipping,
    Discount,
}

const fn slot(kind: PromotionType) -> Option<CouponSlot> {
    match kind {
        PromotionType::FreeShipping => Some(CouponSlot::Shipping),
        PromotionType::Fixed | PromotionType::Percentage => Some(CouponSlot::Discount),
        PromotionType::BuyOneGetOne => None,
    }
}

/// Coupons offered at checkout: live ones of a kind that fits a slot.
#[must_use]
pub fn eligible_coupons(all: Vec<Coupon>, now: DateTime<FixedOffset>) -> Vec<Coupon> {
    all.into_iter()
        .filter(|c| slot(c.kind).is_some() && c.is_live_at(now))
        .collect()
}

/// Apply picks in order; each pick evicts the coupon holding its slot.
/// Unknown ids are ignored.
#[must_use]
pub fn select_coupons(eligible: &[Coupon], picks: &[CouponId]) -> Vec<CouponId> {
    let mut chosen: Vec<&Coupon> = Vec::new();
    for id in picks {
        let Some(coupon) = eligible.iter().find(|c| c.id == *id) else {
            continue;
        };
        let held = slot(coupon.kind);
        chosen.retain(|c| slot(c.kind) != held);
        chosen.push(coupon);
    }
    chosen.into_iter().map(|c| c.id).collect()
}

/// Preselection when the customer has not chosen yet: the first free-shipping
/// coupon, and the first fixed coupon or else the first percentage one.
#[must_use]
pub fn default_coupons(eligible: &[Coupon]) -> Vec<CouponId> {
    let first = |kind: PromotionType| eligible.iter().find(|c| c.kind == kind).map(|c| c.id);
    let shipping = first(PromotionType::FreeShipping);
    let discount = first(PromotionType::Fixed).or_else(|| first(PromotionType::Percentage));
    shipping.into_iter().chain(discount).collect()
}

/// Selection after clicking a coupon: deselect it when chosen, otherwise
/// pick it.
#[must_use]
pub fn toggle_coupon(eligible: &[Coupon], selected: &[CouponId], id: CouponId) -> Vec<CouponId> {
    if selected.contains(&id) {
        return selected.iter().copied().filter(|c| *c != id).collect();
    }
    let mut picks = selected.to_vec();
    picks.push(id);
    select_coupons(eligible, &picks)
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub name: String,
    pub variant_label: String,
    pub image_url: String,
    pub quantity: i32,
    pub total: String,
}

impl From<&CartItem> for CheckoutLine {
    fn from(item: &CartItem) -> Self {
        let variant = item.variant_details.as_ref();
        Self {
            name: item.product_name().to_string(),
            variant_label: variant.map(|v| v.label()).unwrap_or_default(),
            image_url: variant
                .and_then(|v| v.image_url.clone())
                .unwrap_or_default(),
            quantity: item.quantity,
            total: item.total().format(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CouponChoice {
    pub code: String,
    pub description: String,
    pub kind_label: &'static str,
    pub value_label: String,
    pub selected: bool,
    pub toggle_url: String,
}

#[derive(Debug, Clone)]
pub struct AddressChoice {
    pub id: String,
    pub recipient: String,
    pub phone: String,
    pub line: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct DeliveryChoice {
    pub code: String,
    pub name: String,
    pub description: String,
    pub needs_address: bool,
}

#[derive(Debug, Clone)]
pub struct PaymentChoice {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Priced summary of the selection.
#[derive(Debug, Clone)]
pub struct QuoteView {
    pub total_amount: String,
    pub promotion: String,
    pub discount: String,
    pub final_amount: String,
}

impl From<&OrderQuote> for QuoteView {
    fn from(quote: &OrderQuote) -> Self {
        Self {
            total_amount: quote.total_amount.format(),
            promotion: quote.promotion.format(),
            discount: quote.discount.format(),
            final_amount: quote.final_amount.format(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub items_param: String,
    pub coupon_param: String,
    pub lines: Vec<CheckoutLine>,
    pub subtotal: String,
    /// `None` when the backend could not price the selection.
    pub quote: Option<QuoteView>,
    pub coupons: Vec<CouponChoice>,
    pub code: String,
    /// Outcome of a typed coupon code: (accepted, message).
    pub code_result: Option<(bool, String)>,
    pub addresses: Vec<AddressChoice>,
    pub delivery_methods: Vec<DeliveryChoice>,
    pub payment_methods: Vec<PaymentChoice>,
}

#[derive(Template, WebTemplate)]
#[template(path = "payment/result.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub success: bool,
    pub description: String,
    pub order_code: String,
    pub total_amount: String,
    pub paid_at: String,
}

// =============================================================================
// Forms
// =============================================================================

/// `?items=&coupon=&code=`
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    pub items: Option<String>,
    /// Present (possibly empty) once the customer has chosen; absent means
    /// preselect.
    pub coupon: Option<String>,
    pub code: Option<String>,
}

/// Checkout page URL for a selection; a blank code is left out.
#[must_use]
pub fn checkout_url(items: &str, coupon: &str, code: &str) -> String {
    let mut url = url::form_urlencoded::Serializer::new(String::new());
    url.append_pair("items", items).append_pair("coupon", coupon);
    let code = code.trim();
    if !code.is_empty() {
        url.append_pair("code", code);
    }
    format!("/checkout?{}", url.finish())
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub items: String,
    #[serde(default)]
    pub coupon: String,
    #[serde(default)]
    pub code: String,
    pub delivery_method: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub customer_note: String,
}

impl PlaceOrderForm {
    fn back(&self) -> String {
        checkout_url(&self.items, &self.coupon, &self.code)
    }

    /// Build the order body, or the toast text explaining what is missing.
    fn order(&self) -> std::result::Result<NewOrder, &'static str> {
        let cart_item_ids: Vec<CartItemId> = id_list(Some(&self.items));
        if cart_item_ids.is_empty() {
            return Err("Please select at least one item to create an order.");
        }
        let Some(payment_method) = parse_opt::<PaymentMethodId>(self.payment_method.as_deref())
        else {
            return Err("Please choose a payment method.");
        };

        let pickup = self
            .delivery_method
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(DeliveryMethod::IN_STORE_PICKUP));
        let delivery_info = if pickup {
            None
        } else {
            Some(
                parse_opt::<AddressId>(self.address.as_deref())
                    .ok_or("Please select or create a shipping info to proceed.")?,
            )
        };

        let note = self.customer_note.trim();
        Ok(NewOrder {
            payment_method,
            delivery_info,
            customer_note: (!note.is_empty()).then(|| note.to_string()),
            cart_item_ids,
            coupons: id_list(Some(&self.coupon)),
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(show).post(place_order))
        .route("/payment", get(payment))
}

async fn to_cart(auth: &CustomerSession, message: &str) -> Response {
    auth.flash(Flash::error(message)).await;
    Redirect::to("/cart").into_response()
}

/// Validate a typed code; an accepted code is picked like a clicked coupon.
async fn apply_code(
    auth: &CustomerSession,
    code: &str,
    eligible: &[Coupon],
    selected: Vec<CouponId>,
) -> Result<(Vec<CouponId>, Option<(bool, String)>)> {
    if code.trim().is_empty() {
        return Ok((selected, None));
    }
    let validation = auth
        .call(|t| backend::lookups::validate_coupon(auth.api(), t, code))
        .await;
    let validation = match validation {
        Ok(v) => v,
        Err(AppError::Api(err)) if !matches!(err, ApiError::Unauthorized) => {
            warn!(error = %err, "coupon validation failed");
            return Ok((selected, Some((false, err.user_message()))));
        }
        Err(other) => return Err(other),
    };

    match validation.coupon_id.filter(|_| validation.is_valid) {
        Some(id) if eligible.iter().any(|c| c.id == id) => {
            let mut picks = selected;
            picks.push(id);
            let message = validation
                .message
                .unwrap_or_else(|| "Coupon applied".to_string());
            Ok((select_coupons(eligible, &picks), Some((true, message))))
        }
        _ => {
            let message = validation
                .message
                .unwrap_or_else(|| "Invalid coupon code".to_string());
            Ok((selected, Some((false, message))))
        }
    }
}

#[instrument(skip(auth))]
async fn show(
    RequireAuth(auth): RequireAuth,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let item_ids: Vec<CartItemId> = id_list(query.items.as_deref());
    if item_ids.is_empty() {
        return Ok(to_cart(&auth, "Please select at least one item to proceed.").await);
    }

    let api = auth.api();
    let (cart, addresses, delivery, payment, coupons) = tokio::try_join!(
        auth.call(|t| backend::cart::list(api, t)),
        auth.call(|t| backend::addresses::list(api, t)),
        auth.call(|t| backend::lookups::delivery_methods(api, t)),
        auth.call(|t| backend::lookups::payment_methods(api, t)),
        auth.call(|t| backend::lookups::coupons(api, t)),
    )?;

    let cart = cart.into_items();
    let lines: Vec<&CartItem> = cart.iter().filter(|i| item_ids.contains(&i.id)).collect();
    if lines.is_empty() {
        return Ok(to_cart(&auth, "Please select at least one item to proceed.").await);
    }
    let item_ids: Vec<CartItemId> = lines.iter().map(|i| i.id).collect();

    let now = Utc::now().fixed_offset();
    let eligible = eligible_coupons(coupons.into_items(), now);
    let selected = match query.coupon.as_deref() {
        Some(picks) => select_coupons(&eligible, &id_list(Some(picks))),
        None => default_coupons(&eligible),
    };
    let code = query.code.clone().unwrap_or_default();
    let (selected, code_result) = apply_code(&auth, &code, &eligible, selected).await?;

    let request = QuoteRequest {
        cart_item_ids: item_ids.clone(),
        coupon_ids: selected.clone(),
    };
    let quote = match auth
        .call(|t| backend::orders::quote(auth.api(), t, &request))
        .await
    {
        Ok(quote) => Some(QuoteView::from(&quote)),
        Err(AppError::Api(err)) if !matches!(err, ApiError::Unauthorized) => {
            warn!(error = %err, "quote failed");
            None
        }
        Err(other) => return Err(other),
    };

    let items_param = join_ids(&item_ids);
    let coupon_choices = eligible
        .iter()
        .map(|c| {
            // Clicking the coupon the typed code picked drops the code too,
            // or it would be applied again on the next load.
            let carried = if c.code.eq_ignore_ascii_case(code.trim()) {
                ""
            } else {
                code.as_str()
            };
            CouponChoice {
                code: c.code.clone(),
                description: c.description.clone().unwrap_or_default(),
                kind_label: c.kind.label(),
                value_label: c.value_label(),
                selected: selected.contains(&c.id),
                toggle_url: checkout_url(
                    &items_param,
                    &join_ids(&toggle_coupon(&eligible, &selected, c.id)),
                    carried,
                ),
            }
        })
        .collect();

    let template = CheckoutTemplate {
        ctx: PageContext::for_customer(&auth, "/checkout").await,
        coupon_param: join_ids(&selected),
        subtotal: selected_total(&cart, &item_ids).format(),
        lines: lines.into_iter().map(CheckoutLine::from).collect(),
        quote,
        coupons: coupon_choices,
        code,
        code_result,
        addresses: addresses
            .items()
            .iter()
            .map(|a| AddressChoice {
                id: a.id.to_string(),
                recipient: a.recipient_name.clone(),
                phone: a.phone_number.clone(),
                line: a.one_line(),
                is_default: a.is_default,
            })
            .collect(),
        delivery_methods: delivery
            .items()
            .iter()
            .map(|m| DeliveryChoice {
                code: m.code.clone(),
                name: m.name.clone(),
                description: m.description.clone().unwrap_or_default(),
                needs_address: m.needs_address(),
            })
            .collect(),
        payment_methods: payment
            .items()
            .iter()
            .filter(|m| m.is_active)
            .map(|m| PaymentChoice {
                id: m.id.to_string(),
                name: m.name.clone(),
                description: m.description.clone().unwrap_or_default(),
                image_url: m.image_url.clone().unwrap_or_default(),
            })
            .collect(),
        items_param,
    };
    Ok(template.into_response())
}

#[instrument(skip_all)]
async fn place_order(
    RequireAuth(auth): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Redirect> {
    let order = match form.order() {
        Ok(order) => order,
        Err(message) => {
            auth.flash(Flash::error(message)).await;
            let back = if id_list::<CartItemId>(Some(&form.items)).is_empty() {
                "/cart".to_string()
            } else {
                form.back()
            };
            return Ok(Redirect::to(&back));
        }
    };

    add_breadcrumb(
        "checkout",
        "place order",
        &[
            ("items", form.items.clone()),
            ("payment_method", order.payment_method.to_string()),
        ],
    );
    let result = auth
        .call(|t| backend::orders::create(auth.api(), t, &order))
        .await;
    let Some(created) = report(
        &auth,
        result,
        "Order created successfully!",
        "Failed to create order.",
    )
    .await?
    else {
        return Ok(Redirect::to(&form.back()));
    };

    info!(order = %created.order_code, "order placed");
    match created.vnpay_payment_url.filter(|url| url.starts_with("https://")) {
        Some(url) => Ok(Redirect::to(&url)),
        None => Ok(Redirect::to("/account/order?type=Pending")),
    }
}

/// Gateway return: the query string is forwarded verbatim for verification.
#[instrument(skip_all)]
async fn payment(
    RequireAuth(auth): RequireAuth,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response> {
    if params.is_empty() {
        return Ok(Redirect::to("/account/order").into_response());
    }

    let outcome = auth
        .call(|t| backend::payments::process(auth.api(), t, &params))
        .await;
    let template = match outcome {
        Ok(result) => PaymentTemplate {
            ctx: PageContext::for_customer(&auth, "/payment").await,
            success: result.is_success(),
            description: result.description.clone().unwrap_or_default(),
            order_code: result.order_info.clone().unwrap_or_default(),
            total_amount: result.total_amount.unwrap_or_default().format(),
            paid_at: result.paid_at.clone().unwrap_or_default(),
        },
        Err(AppError::Api(err)) if !matches!(err, ApiError::Unauthorized) => {
            warn!(error = %err, "payment processing failed");
            PaymentTemplate {
                ctx: PageContext::for_customer(&auth, "/payment").await,
                success: false,
                description: err.user_message(),
                order_code: params.get("vnp_OrderInfo").cloned().unwrap_or_default(),
                total_amount: String::new(),
                paid_at: String::new(),
            }
        }
        Err(other) => return Err(other),
    };
    Ok(template.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coupons() -> Vec<Coupon> {
        serde_json::from_str(
            r#"[
                {"id": 1, "code": "SHIP1", "type": "free shipping", "is_active": true,
                 "start_date": "2025-01-01T00:00:00+07:00", "end_date": "2030-01-01T00:00:00+07:00"},
                {"id": 2, "code": "TEN", "type": "percentage", "value": 10, "is_active": true,
                 "start_date": "2025-01-01T00:00:00+07:00", "end_date": "2030-01-01T00:00:00+07:00"},
                {"id": 3, "code": "50K", "type": "fixed", "value": 50000, "is_active": true,
                 "start_date": "2025-01-01T00:00:00+07:00", "end_date": "2030-01-01T00:00:00+07:00"},
                {"id": 4, "code": "BOGO", "type": "buy one get one", "is_active": true,
                 "start_date": "2025-01-01T00:00:00+07:00", "end_date": "2030-01-01T00:00:00+07:00"},
                {"id": 5, "code": "OLD", "type": "fixed", "value": 20000, "is_active": true,
                 "start_date": "2024-01-01T00:00:00+07:00", "end_date": "2024-02-01T00:00:00+07:00"},
                {"id": 6, "code": "SHIP2", "type": "free shipping", "is_active": true,
                 "start_date": "2025-01-01T00:00:00+07:00", "end_date": "2030-01-01T00:00:00+07:00"}
            ]"#,
        )
        .unwrap()
    }

    fn eligible() -> Vec<Coupon> {
        let now = DateTime::parse_from_rfc3339("2026-06-01T12:00:00+07:00").unwrap();
        eligible_coupons(coupons(), now)
    }

    fn ids(raw: &[i32]) -> Vec<CouponId> {
        raw.iter().copied().map(CouponId::new).collect()
    }

    #[test]
    fn test_eligible_drops_expired_and_bogo() {
        let codes: Vec<String> = eligible().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, ["SHIP1", "TEN", "50K", "SHIP2"]);
    }

    #[test]
    fn test_default_prefers_fixed_discount() {
        assert_eq!(default_coupons(&eligible()), ids(&[1, 3]));
    }

    #[test]
    fn test_one_coupon_per_slot() {
        let all = eligible();
        // Percentage then fixed: the fixed one takes the discount slot.
        assert_eq!(select_coupons(&all, &ids(&[2, 3])), ids(&[3]));
        assert_eq!(select_coupons(&all, &ids(&[1, 2, 6])), ids(&[2, 6]));
        // Unknown and ineligible ids are ignored.
        assert_eq!(select_coupons(&all, &ids(&[4, 5, 99])), ids(&[]));
    }

    #[test]
    fn test_toggle_coupon() {
        let all = eligible();
        assert_eq!(toggle_coupon(&all, &ids(&[1, 3]), CouponId::new(3)), ids(&[1]));
        assert_eq!(toggle_coupon(&all, &ids(&[1, 3]), CouponId::new(2)), ids(&[1, 2]));
    }

    #[test]
    fn test_checkout_url_carries_typed_code() {
        assert_eq!(
            checkout_url("3,5", "1", " summer 10 "),
            "/checkout?items=3%2C5&coupon=1&code=summer+10"
        );
        assert_eq!(checkout_url("3", "", "  "), "/checkout?items=3&coupon=");
    }

    #[test]
    fn test_back_link_keeps_selection_and_code() {
        let form = PlaceOrderForm {
            items: "3".into(),
            coupon: "1,3".into(),
            code: "SHIP1".into(),
            delivery_method: None,
            address: None,
            payment_method: None,
            customer_note: String::new(),
        };
        assert_eq!(form.back(), "/checkout?items=3&coupon=1%2C3&code=SHIP1");
    }

    #[test]
    fn test_place_order_form_validation() {
        let mut form = PlaceOrderForm {
            items: "3,5".into(),
            coupon: "1".into(),
            code: String::new(),
            delivery_method: Some("STANDARD".into()),
            address: None,
            payment_method: Some("2".into()),
            customer_note: "  ".into(),
        };
        assert_eq!(
            form.order().unwrap_err(),
            "Please select or create a shipping info to proceed."
        );

        form.delivery_method = Some("IN_STORE_PICKUP".into());
        let order = form.order().unwrap();
        assert!(order.delivery_info.is_none());
        assert!(order.customer_note.is_none());
        assert_eq!(order.coupons, ids(&[1]));

        form.items = String::new();
        assert_eq!(
            form.order().unwrap_err(),
            "Please select at least one item to create an order."
        );
    }
}
