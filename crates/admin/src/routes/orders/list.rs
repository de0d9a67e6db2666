//! Order grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Query;
use boutique_core::{OrderFilter, OrderStatusRecord};
use tracing::{debug, instrument};

use super::types::{OrderRow, OrdersQuery, matches_search};
use crate::backend;
use crate::components::data_table::orders_table_config;
use crate::components::{DataTableConfig, PageContext, Pagination};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub ctx: PageContext,
    pub table: DataTableConfig,
    pub rows: Vec<OrderRow>,
    pub pagination: Pagination,
}

/// Orders list page handler.
///
/// The status filter arrives as a status code; the backend filters by status
/// id, so the code is resolved through `/order-statuses/` first. A search
/// term narrows the fetched page.
#[instrument(skip(auth))]
pub async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersIndexTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let status_code = OrdersQuery::value(query.status.as_ref());
    let search = OrdersQuery::value(query.search.as_ref()).unwrap_or_default();

    let status = match &status_code {
        Some(code) => {
            let statuses = auth
                .call(|t| backend::orders::statuses(auth.api(), t))
                .await?;
            let id = OrderStatusRecord::id_for_code(statuses.items(), code);
            debug!(code = %code, ?id, "resolved status filter");
            id
        }
        None => None,
    };

    let filter = OrderFilter {
        status,
        start_date: OrdersQuery::value(query.start_date.as_ref()),
        end_date: OrdersQuery::value(query.end_date.as_ref()),
        ..OrderFilter::default()
    };

    // An unknown status code matches nothing rather than everything.
    let (rows, total, has_next) = if status_code.is_some() && status.is_none() {
        (Vec::new(), 0, false)
    } else {
        let orders = auth
            .call(|t| backend::orders::list(auth.api(), t, &filter, Some(page)))
            .await?;
        (
            orders
                .items()
                .iter()
                .filter(|order| matches_search(order, &search))
                .map(OrderRow::from)
                .collect(),
            orders.total(),
            orders.has_next(),
        )
    };

    let params = query.params();
    Ok(OrdersIndexTemplate {
        ctx: PageContext::new(&auth, "/orders").await,
        table: orders_table_config().with_values(&params),
        rows,
        pagination: Pagination::new("/orders", &params, page, total, has_next),
    })
}
