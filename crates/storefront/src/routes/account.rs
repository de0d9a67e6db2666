//! Order history.
//!
//! Tabs come from `/order-statuses/`; `?type=` carries the status name
//! (`Pending`, `Cancelled`) and `All` or no value shows every order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{
    CancelOrder, Order, OrderFilter, OrderId, OrderItem, OrderStatusId, OrderStatusRecord,
    format_datetime,
};
use serde::Deserialize;
use tracing::instrument;

use super::report;
use crate::backend;
use crate::components::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Status tab.
#[derive(Debug, Clone)]
pub struct StatusTab {
    pub name: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub variant: String,
    pub image_url: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        let variant = item.variant_details.as_ref();
        let detail = [item.size.as_deref(), item.color.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        Self {
            name: item
                .product_name
                .clone()
                .or_else(|| {
                    variant
                        .and_then(|v| v.product_details.as_ref())
                        .map(|p| p.name.clone())
                })
                .unwrap_or_default(),
            variant: if detail.is_empty() {
                variant.map(|v| v.label()).unwrap_or_default()
            } else {
                detail
            },
            image_url: item
                .variant_image
                .clone()
                .or_else(|| variant.and_then(|v| v.image_url.clone()))
                .unwrap_or_default(),
            quantity: item.quantity,
            unit_price: item.unit_price().format(),
            subtotal: item.subtotal().format(),
        }
    }
}

/// One order card.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub code: String,
    pub status: String,
    pub status_message: &'static str,
    pub placed_at: String,
    pub item_count: i64,
    pub lines: Vec<OrderLineView>,
    pub shipping_fee: String,
    pub discount: String,
    pub final_amount: String,
    pub payment_method: String,
    pub address: String,
    pub note: String,
    pub can_cancel: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            code: order.order_code.clone(),
            status: order
                .current_status_details
                .as_ref()
                .map(|s| s.display_name().to_string())
                .unwrap_or_default(),
            status_message: order.status_message(),
            placed_at: order.placed_at().map(format_datetime).unwrap_or_default(),
            item_count: order.item_count(),
            lines: order.order_items.iter().map(OrderLineView::from).collect(),
            shipping_fee: order.shipping_fee.format(),
            discount: order.discount_amount.format(),
            final_amount: order.final_amount.format(),
            payment_method: order
                .payment_method_details
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            address: order
                .delivery_address_details
                .as_ref()
                .map(|a| format!("{}, {} - {}", a.recipient_name, a.phone_number, a.one_line()))
                .unwrap_or_default(),
            note: order.customer_note.clone().unwrap_or_default(),
            can_cancel: order.can_cancel(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub tabs: Vec<StatusTab>,
    pub all_active: bool,
    pub orders: Vec<OrderView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order: OrderView,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Status id for a `?type=` tab name; `All`, blank and unknown names mean no
/// filter.
#[must_use]
pub fn status_for_tab(statuses: &[OrderStatusRecord], tab: Option<&str>) -> Option<OrderStatusId> {
    let tab = tab.map(str::trim).filter(|t| !t.eq_ignore_ascii_case("all"))?;
    statuses
        .iter()
        .find(|s| s.display_name().eq_ignore_ascii_case(tab))
        .map(|s| s.id)
        .or_else(|| OrderStatusRecord::id_for_code(statuses, tab))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account/order", get(index))
        .route("/account/order/{id}", get(show))
        .route("/account/order/{id}/cancel", post(cancel))
}

#[instrument(skip(auth))]
async fn index(
    RequireAuth(auth): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let statuses = auth
        .call(|t| backend::orders::statuses(auth.api(), t))
        .await?
        .into_items();
    let status = status_for_tab(&statuses, query.kind.as_deref());

    let filter = OrderFilter {
        status,
        ..OrderFilter::default()
    };
    let orders = auth
        .call(|t| backend::orders::list(auth.api(), t, &filter))
        .await?;

    Ok(OrdersTemplate {
        ctx: PageContext::for_customer(&auth, "/account/order").await,
        tabs: statuses
            .iter()
            .map(|s| StatusTab {
                name: s.display_name().to_string(),
                href: format!(
                    "/account/order?type={}",
                    urlencoding::encode(s.display_name())
                ),
                active: Some(s.id) == status,
            })
            .collect(),
        all_active: status.is_none(),
        orders: orders.items().iter().map(OrderView::from).collect(),
    })
}

#[instrument(skip(auth))]
async fn show(RequireAuth(auth): RequireAuth, Path(id): Path<OrderId>) -> Result<OrderTemplate> {
    let order = auth
        .call(|t| backend::orders::get(auth.api(), t, id))
        .await?;
    Ok(OrderTemplate {
        ctx: PageContext::for_customer(&auth, "/account/order").await,
        order: OrderView::from(&order),
    })
}

#[instrument(skip(auth))]
async fn cancel(RequireAuth(auth): RequireAuth, Path(id): Path<OrderId>) -> Result<Redirect> {
    let body = CancelOrder::default();
    let result = auth
        .call(|t| backend::orders::cancel(auth.api(), t, id, &body))
        .await;
    let cancelled = report(
        &auth,
        result,
        "Order cancelled successfully!",
        "Failed to cancel order. Please try again.",
    )
    .await?;

    Ok(Redirect::to(if cancelled.is_some() {
        "/account/order?type=Cancelled"
    } else {
        "/account/order"
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn statuses() -> Vec<OrderStatusRecord> {
        serde_json::from_str(
            r#"[
                {"id": 1, "status_code": "PENDING", "status_name": "Pending"},
                {"id": 5, "status_code": "CANCELLED", "status_name": "Cancelled"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_status_for_tab() {
        let all = statuses();
        assert_eq!(status_for_tab(&all, Some("Pending")), Some(OrderStatusId::new(1)));
        assert_eq!(status_for_tab(&all, Some("cancelled")), Some(OrderStatusId::new(5)));
        assert_eq!(status_for_tab(&all, Some("All")), None);
        assert_eq!(status_for_tab(&all, Some("Lost")), None);
        assert_eq!(status_for_tab(&all, None), None);
    }

    #[test]
    fn test_order_view_uses_status_message() {
        let order: Order = serde_json::from_str(
            r#"{"id": 31, "order_code": "ORD-0031", "final_amount": "630000.00",
                "current_status_details": {"id": 1, "status_code": "PENDING", "status_name": "Pending"},
                "order_items": [{"id": 1, "quantity": 2, "price_at_purchase": 315000,
                                 "product_name": "Tee", "size": "M", "color": "Black"}]}"#,
        )
        .unwrap();
        let view = OrderView::from(&order);
        assert_eq!(view.status_message, "Order is being processed");
        assert!(view.can_cancel);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.lines.first().map(|l| l.variant.as_str()), Some("M / Black"));
    }
}
