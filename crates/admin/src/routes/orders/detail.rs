//! Order detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Path;
use boutique_core::OrderId;
use tracing::instrument;

use super::types::{HistoryView, OrderDetailView, ShippingInfoView};
use crate::backend;
use crate::components::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub ctx: PageContext,
    pub order: OrderDetailView,
    pub history: Vec<HistoryView>,
    pub shipping_info: Option<ShippingInfoView>,
}

/// Order detail page handler.
#[instrument(skip(auth))]
pub async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<OrderShowTemplate> {
    let (order, history) = tokio::try_join!(
        auth.call(|t| backend::orders::get(auth.api(), t, id)),
        auth.call(|t| backend::orders::history(auth.api(), t, id)),
    )?;

    let shipping_info = match order.user {
        Some(user) => auth
            .call(|t| backend::shipping_info::for_user(auth.api(), t, user))
            .await?
            .items()
            .first()
            .map(ShippingInfoView::from),
        None => None,
    };

    Ok(OrderShowTemplate {
        ctx: PageContext::new(&auth, "/orders").await,
        order: OrderDetailView::from(&order),
        history: history.items().iter().map(HistoryView::from).collect(),
        shipping_info,
    })
}
