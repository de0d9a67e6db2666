//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, routing::get};
use boutique_core::{OrderFilter, OrderStatusRecord, ProductFilter, format_datetime};
use futures::future::try_join_all;
use tracing::instrument;

use crate::backend;
use crate::components::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Orders count for one status card.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub code: String,
    pub label: String,
    pub count: u64,
}

/// Recent order row.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub code: String,
    pub customer: String,
    pub date: String,
    pub status: String,
    pub total: String,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub product_count: u64,
    pub order_count: u64,
    pub user_count: u64,
    pub status_counts: Vec<StatusCount>,
    pub recent_orders: Vec<RecentOrderView>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
#[instrument(skip(auth))]
async fn dashboard(RequireAdminAuth(auth): RequireAdminAuth) -> Result<DashboardTemplate> {
    let api = auth.api();
    let all_products = ProductFilter::default();
    let all_orders = OrderFilter::default();

    let (products, orders, users, statuses) = tokio::try_join!(
        auth.call(|t| backend::products::list(api, t, &all_products)),
        auth.call(|t| backend::orders::list(api, t, &all_orders, None)),
        auth.call(|t| backend::users::list(api, t, None, None)),
        auth.call(|t| backend::orders::statuses(api, t)),
    )?;

    let statuses = statuses.into_items();
    let per_status = try_join_all(statuses.iter().map(|status| {
        let auth = &auth;
        let filter = OrderFilter {
            status: Some(status.id),
            ..OrderFilter::default()
        };
        async move {
            auth.call(|t| backend::orders::list(api, t, &filter, None))
                .await
                .map(|listing| listing.total())
        }
    }))
    .await?;

    let status_counts = statuses
        .iter()
        .zip(per_status)
        .map(|(status, count)| StatusCount {
            code: status.status_code.to_lowercase(),
            label: status.display_name().to_string(),
            count,
        })
        .collect();

    let order_count = orders.total();
    let recent_orders = orders
        .into_items()
        .iter()
        .take(5)
        .map(|order| RecentOrderView {
            id: order.id.to_string(),
            code: order.order_code.clone(),
            customer: order
                .user_details
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default(),
            date: order.placed_at().map(format_datetime).unwrap_or_default(),
            status: order
                .current_status_details
                .as_ref()
                .map(OrderStatusRecord::display_name)
                .unwrap_or_default()
                .to_string(),
            total: order.final_amount.format(),
        })
        .collect();

    Ok(DashboardTemplate {
        ctx: PageContext::new(&auth, "/").await,
        product_count: products.total(),
        order_count,
        user_count: users.total(),
        status_counts,
        recent_orders,
    })
}
