//! `/orders/` as seen by the customer.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{
    CancelOrder, Listing, NewOrder, Order, OrderFilter, OrderId, OrderQuote, OrderStatusRecord,
    QuoteRequest,
};
use serde_json::Value;

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    filter: &OrderFilter,
) -> Result<Listing<Order>, ApiError> {
    api.get_query("orders/", &filter.query_pairs(), Some(&token))
        .await
}

pub async fn get(api: &ApiClient, token: AccessToken, id: OrderId) -> Result<Order, ApiError> {
    api.get(&format!("orders/{id}/"), Some(&token)).await
}

/// Place an order. The response carries `vnpay_payment_url` for gateway payments.
pub async fn create(api: &ApiClient, token: AccessToken, order: &NewOrder) -> Result<Order, ApiError> {
    api.post("orders/", order, Some(&token)).await
}

/// Price a cart selection with coupons applied, without placing an order.
pub async fn quote(
    api: &ApiClient,
    token: AccessToken,
    request: &QuoteRequest,
) -> Result<OrderQuote, ApiError> {
    api.post("orders/temporary/", request, Some(&token)).await
}

pub async fn cancel(
    api: &ApiClient,
    token: AccessToken,
    id: OrderId,
    body: &CancelOrder,
) -> Result<Value, ApiError> {
    api.post(&format!("orders/{id}/cancel/"), body, Some(&token))
        .await
}

pub async fn statuses(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<OrderStatusRecord>, ApiError> {
    api.get("order-statuses/", Some(&token)).await
}
