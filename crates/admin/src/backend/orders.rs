//! `/orders/` and `/order-statuses/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{
    CancelOrder, Listing, NewOrder, Order, OrderFilter, OrderHistory, OrderId,
    OrderStatusRecord, OrderUpdate,
};
use serde_json::Value;

pub async fn list(
    api: &ApiClient,
    token: AccessToken,
    filter: &OrderFilter,
    page: Option<u32>,
) -> Result<Listing<Order>, ApiError> {
    let mut params = filter.query_pairs();
    if let Some(page) = page.filter(|p| *p > 1) {
        params.push(("page", page.to_string()));
    }
    api.get_query("orders/", &params, Some(&token)).await
}

pub async fn get(api: &ApiClient, token: AccessToken, id: OrderId) -> Result<Order, ApiError> {
    api.get(&format!("orders/{id}/"), Some(&token)).await
}

/// Place an order on behalf of the token's account.
pub async fn create(api: &ApiClient, token: AccessToken, order: &NewOrder) -> Result<Order, ApiError> {
    api.post("orders/", order, Some(&token)).await
}

pub async fn update(
    api: &ApiClient,
    token: AccessToken,
    id: OrderId,
    update: &OrderUpdate,
) -> Result<Order, ApiError> {
    api.put(&format!("orders/{id}/"), update, Some(&token)).await
}

pub async fn delete(api: &ApiClient, token: AccessToken, id: OrderId) -> Result<(), ApiError> {
    api.delete(&format!("orders/{id}/"), Some(&token)).await
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

/// Advance the order to its next status.
pub async fn process(api: &ApiClient, token: AccessToken, id: OrderId) -> Result<Value, ApiError> {
    api.post(
        &format!("orders/{id}/process/"),
        &serde_json::json!({}),
        Some(&token),
    )
    .await
}

pub async fn statuses(
    api: &ApiClient,
    token: AccessToken,
) -> Result<Listing<OrderStatusRecord>, ApiError> {
    api.get("order-statuses/", Some(&token)).await
}

pub async fn history(
    api: &ApiClient,
    token: AccessToken,
    id: OrderId,
) -> Result<Listing<OrderHistory>, ApiError> {
    api.get(&format!("orders/{id}/history/"), Some(&token)).await
}
