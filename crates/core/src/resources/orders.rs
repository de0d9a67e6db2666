//! Order resources.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::address::DeliveryAddress;
use super::catalog::Variant;
use super::payment::PaymentMethod;
use super::users::User;
use crate::types::{
    AddressId, CartItemId, CouponId, OrderHistoryId, OrderId, OrderItemId, OrderStatus,
    OrderStatusId, PaymentMethodId, ShippingMethodId, UserId, Vnd,
};

/// Row of `GET /order-statuses/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusRecord {
    pub id: OrderStatusId,
    pub status_code: String,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl OrderStatusRecord {
    /// The known status for this record's code.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_code(&self.status_code)
    }

    /// Display name, falling back to the code.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.status_name.as_deref().unwrap_or(&self.status_code)
    }

    /// Customer-facing message for this status.
    #[must_use]
    pub fn message(&self) -> &'static str {
        OrderStatus::message_for_code(&self.status_code)
    }

    /// Resolve the backend id of a status code from a status list.
    #[must_use]
    pub fn id_for_code(records: &[Self], code: &str) -> Option<OrderStatusId> {
        records
            .iter()
            .find(|r| r.status_code.eq_ignore_ascii_case(code.trim()))
            .map(|r| r.id)
    }
}

/// Row of `GET /shipping-methods/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    #[serde(default)]
    pub method_code: Option<String>,
    pub method_name: String,
    #[serde(default)]
    pub base_cost: Vnd,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Row of `GET /delivery-methods/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryMethod {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DeliveryMethod {
    /// Code of the method that needs no delivery address.
    pub const IN_STORE_PICKUP: &'static str = "IN_STORE_PICKUP";

    #[must_use]
    pub fn needs_address(&self) -> bool {
        !self.code.eq_ignore_ascii_case(Self::IN_STORE_PICKUP)
    }
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub variant_details: Option<Variant>,
    pub quantity: i32,
    #[serde(default)]
    pub price_at_purchase: Vnd,
    #[serde(default)]
    pub sale_price_at_purchase: Option<Vnd>,
    #[serde(default)]
    pub item_subtotal: Option<Vnd>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub variant_image: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl OrderItem {
    /// Unit price actually charged.
    #[must_use]
    pub fn unit_price(&self) -> Vnd {
        match self.sale_price_at_purchase {
            Some(sale) if sale > Vnd::ZERO => sale,
            _ => self.price_at_purchase,
        }
    }

    /// Line subtotal; computed from quantity × purchase price when the backend omits it.
    #[must_use]
    pub fn subtotal(&self) -> Vnd {
        self.item_subtotal
            .unwrap_or_else(|| self.price_at_purchase.times(self.quantity))
    }
}

/// An order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_code: String,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub user_details: Option<User>,
    #[serde(default)]
    pub delivery_address: Option<AddressId>,
    #[serde(default)]
    pub delivery_address_details: Option<DeliveryAddress>,
    #[serde(default)]
    pub shipping_method_details: Option<ShippingMethod>,
    #[serde(default)]
    pub payment_method_details: Option<PaymentMethod>,
    #[serde(default)]
    pub current_status_details: Option<OrderStatusRecord>,
    #[serde(default)]
    pub order_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub total_amount: Vnd,
    #[serde(default)]
    pub shipping_fee: Vnd,
    #[serde(default)]
    pub tax_amount: Vnd,
    #[serde(default)]
    pub discount_amount: Vnd,
    #[serde(default)]
    pub final_amount: Vnd,
    #[serde(default)]
    pub customer_note: Option<String>,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub vnpay_payment_url: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Known status of the order, if the backend sent one we recognise.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.current_status_details
            .as_ref()
            .and_then(OrderStatusRecord::status)
    }

    /// Status code as sent by the backend (empty when missing).
    #[must_use]
    pub fn status_code(&self) -> &str {
        self.current_status_details
            .as_ref()
            .map_or("", |s| s.status_code.as_str())
    }

    #[must_use]
    pub fn status_message(&self) -> &'static str {
        OrderStatus::message_for_code(self.status_code())
    }

    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.status().is_some_and(OrderStatus::is_cancellable)
    }

    #[must_use]
    pub fn can_process(&self) -> bool {
        self.status().is_some_and(OrderStatus::is_processable)
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn items_total(&self) -> Vnd {
        self.order_items.iter().map(OrderItem::subtotal).sum()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.order_items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Timestamp shown in lists: order date, falling back to creation time.
    #[must_use]
    pub fn placed_at(&self) -> Option<&DateTime<FixedOffset>> {
        self.order_date.as_ref().or(self.created_at.as_ref())
    }
}

/// Row of `GET /orders/{id}/history/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistory {
    pub id: OrderHistoryId,
    #[serde(default)]
    pub status_details: Option<OrderStatusRecord>,
    #[serde(default)]
    pub staff_in_charge_details: Option<User>,
    #[serde(default)]
    pub changed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `PUT /orders/{id}/` as used from the order detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<AddressId>,
}

/// Body of `POST /orders/{id}/cancel/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CancelOrder {
    pub reason: Option<String>,
}

/// Body of `POST /orders/` (checkout from cart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub payment_method: PaymentMethodId,
    /// Delivery address id; absent for in-store pickup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_info: Option<AddressId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
    pub cart_item_ids: Vec<CartItemId>,
    #[serde(default)]
    pub coupons: Vec<CouponId>,
}

/// Body of `POST /orders/temporary/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub cart_item_ids: Vec<CartItemId>,
    #[serde(default)]
    pub coupon_ids: Vec<CouponId>,
}

/// Response of `POST /orders/temporary/`: a priced preview of a cart selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderQuote {
    /// Sum at list prices.
    #[serde(default)]
    pub total_amount: Vnd,
    /// Sale-price savings (zero or negative).
    #[serde(default)]
    pub promotion: Vnd,
    /// Coupon discount.
    #[serde(default)]
    pub discount: Vnd,
    #[serde(default)]
    pub final_amount: Vnd,
}

/// Filters accepted by `GET /orders/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatusId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

impl OrderFilter {
    /// Query parameters for `GET /orders/`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(start) = &self.start_date {
            pairs.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date", end.clone()));
        }
        if let Some(min) = self.min_amount {
            pairs.push(("min_amount", min.to_string()));
        }
        if let Some(max) = self.max_amount {
            pairs.push(("max_amount", max.to_string()));
        }
        if let Some(method) = self.payment_method {
            pairs.push(("payment_method", method.to_string()));
        }
        if let Some(user) = self.user {
            pairs.push(("user", user.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "id": 31,
        "order_code": "ORD-0031",
        "current_status_details": {"id": 2, "status_code": "PACKED", "status_name": "Packed"},
        "order_date": "2025-03-05T14:07:00+07:00",
        "total_amount": "600000.00",
        "shipping_fee": 30000,
        "discount_amount": 0,
        "final_amount": 630000,
        "order_items": [
            {"id": 1, "quantity": 2, "price_at_purchase": 200000, "product_name": "Tee"},
            {"id": 2, "quantity": 1, "price_at_purchase": 200000, "item_subtotal": 200000,
             "sale_price_at_purchase": 150000}
        ]
    }"#;

    #[test]
    fn test_order_status_helpers() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.status(), Some(OrderStatus::Packed));
        assert_eq!(
            order.status_message(),
            "Order has been packed, waiting for shipment"
        );
        assert!(order.can_cancel());
        assert!(order.can_process());
    }

    #[test]
    fn test_order_item_subtotal_fallback() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.order_items[0].subtotal(), Vnd::new(400_000));
        assert_eq!(order.order_items[1].subtotal(), Vnd::new(200_000));
        assert_eq!(order.order_items[1].unit_price(), Vnd::new(150_000));
        assert_eq!(order.items_total(), Vnd::new(600_000));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_order_without_status_is_unknown() {
        let order: Order = serde_json::from_str(r#"{"id": 1, "order_code": "X"}"#).unwrap();
        assert_eq!(order.status_message(), "Unknown status");
        assert!(!order.can_cancel());
    }

    #[test]
    fn test_status_id_lookup() {
        let records: Vec<OrderStatusRecord> = serde_json::from_str(
            r#"[{"id": 1, "status_code": "PENDING"}, {"id": 4, "status_code": "DELIVERED"}]"#,
        )
        .unwrap();
        assert_eq!(
            OrderStatusRecord::id_for_code(&records, "delivered"),
            Some(OrderStatusId::new(4))
        );
        assert_eq!(OrderStatusRecord::id_for_code(&records, "RETURNED"), None);
    }

    #[test]
    fn test_new_order_wire_names() {
        let body = NewOrder {
            payment_method: PaymentMethodId::new(1),
            delivery_info: Some(AddressId::new(3)),
            customer_note: None,
            cart_item_ids: vec![CartItemId::new(8), CartItemId::new(9)],
            coupons: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["delivery_info"], 3);
        assert_eq!(json["cart_item_ids"], serde_json::json!([8, 9]));
        assert!(json.get("customer_note").is_none());
    }

    #[test]
    fn test_order_filter_query() {
        let filter = OrderFilter {
            status: Some(OrderStatusId::new(3)),
            min_amount: Some(100_000),
            ..OrderFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("status", "3".to_string()), ("min_amount", "100000".to_string())]
        );
    }
}
