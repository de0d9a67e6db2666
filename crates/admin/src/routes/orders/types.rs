//! View models for the order screens.

use boutique_core::{
    Order, OrderHistory, OrderItem, OrderStatus, OrderStatusRecord, ShippingInfo, format_datetime,
};
use serde::Deserialize;

/// Query parameters of the order grid.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// Status code (`PENDING`, ...), mapped to the backend's status id.
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Customer name, email or order code. The backend has no search
    /// parameter, so this narrows the fetched page.
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl OrdersQuery {
    /// Non-empty trimmed value.
    pub(super) fn value(field: Option<&String>) -> Option<String> {
        field
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Query parameters to carry through pagination and filter inputs.
    pub(super) fn params(&self) -> [(&'static str, String); 4] {
        [
            ("status", self.status.clone().unwrap_or_default()),
            ("start_date", self.start_date.clone().unwrap_or_default()),
            ("end_date", self.end_date.clone().unwrap_or_default()),
            ("search", self.search.clone().unwrap_or_default()),
        ]
    }
}

/// Case-insensitive match of `term` against the order code and the
/// customer's name and email.
pub(super) fn matches_search(order: &Order, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let customer = order.user_details.as_ref();
    [
        Some(order.order_code.as_str()),
        customer.map(|u| u.display_name()),
        customer.map(|u| u.email.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

/// CSS modifier for a status badge.
fn badge_class(code: &str) -> &'static str {
    match OrderStatus::from_code(code) {
        Some(OrderStatus::Pending) => "badge-pending",
        Some(OrderStatus::Packed | OrderStatus::Delivering) => "badge-progress",
        Some(OrderStatus::Delivered) => "badge-success",
        Some(OrderStatus::Cancelled | OrderStatus::Returned | OrderStatus::Refunded) => {
            "badge-muted"
        }
        None => "badge-unknown",
    }
}

/// Order grid row.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub code: String,
    pub customer: String,
    pub date: String,
    pub payment: String,
    pub status: String,
    pub status_class: &'static str,
    pub total: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            code: order.order_code.clone(),
            customer: order
                .user_details
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default(),
            date: order.placed_at().map(format_datetime).unwrap_or_default(),
            payment: order
                .payment_method_details
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            status: status_name(order),
            status_class: badge_class(order.status_code()),
            total: order.final_amount.format(),
        }
    }
}

fn status_name(order: &Order) -> String {
    order
        .current_status_details
        .as_ref()
        .map(OrderStatusRecord::display_name)
        .unwrap_or("Unknown")
        .to_string()
}

/// Order line.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub name: String,
    pub image_url: Option<String>,
    pub sku: String,
    pub variant: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&OrderItem> for ItemView {
    fn from(item: &OrderItem) -> Self {
        let variant = match (item.size.as_deref(), item.color.as_deref()) {
            (Some(s), Some(c)) => format!("{s} / {c}"),
            (Some(one), None) | (None, Some(one)) => one.to_string(),
            (None, None) => item
                .variant_details
                .as_ref()
                .map(boutique_core::Variant::label)
                .unwrap_or_default(),
        };
        Self {
            name: item.product_name.clone().unwrap_or_default(),
            image_url: item.variant_image.clone(),
            sku: item.sku.clone().unwrap_or_default(),
            variant,
            quantity: item.quantity,
            unit_price: item.unit_price().format(),
            subtotal: item.subtotal().format(),
        }
    }
}

/// One entry of the status history.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub status: String,
    pub staff: String,
    pub changed_at: String,
    pub note: String,
}

impl From<&OrderHistory> for HistoryView {
    fn from(entry: &OrderHistory) -> Self {
        Self {
            status: entry
                .status_details
                .as_ref()
                .map(OrderStatusRecord::display_name)
                .unwrap_or_default()
                .to_string(),
            staff: entry
                .staff_in_charge_details
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default(),
            changed_at: entry
                .changed_at
                .as_ref()
                .map(format_datetime)
                .unwrap_or_default(),
            note: entry.note.clone().unwrap_or_default(),
        }
    }
}

/// Editable shipping record of the order's customer.
#[derive(Debug, Clone, Default)]
pub struct ShippingInfoView {
    pub id: String,
    pub recipient_name: String,
    pub phone_number: String,
    pub address: String,
    pub ward: String,
    pub district: String,
    pub city: String,
}

impl From<&ShippingInfo> for ShippingInfoView {
    fn from(info: &ShippingInfo) -> Self {
        Self {
            id: info.id.to_string(),
            recipient_name: info.recipient_name.clone(),
            phone_number: info.phone_number.clone(),
            address: info.address.clone().unwrap_or_default(),
            ward: info.ward.clone().unwrap_or_default(),
            district: info.district.clone().unwrap_or_default(),
            city: info.city.clone().unwrap_or_default(),
        }
    }
}

/// Order detail.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: String,
    pub code: String,
    pub status: String,
    pub status_class: &'static str,
    pub status_message: &'static str,
    pub date: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_id: String,
    pub delivery_address: String,
    pub shipping_method: String,
    pub payment_method: String,
    pub customer_note: String,
    pub admin_note: String,
    pub items: Vec<ItemView>,
    pub item_count: i64,
    pub items_total: String,
    pub shipping_fee: String,
    pub tax_amount: String,
    pub discount_amount: String,
    pub final_amount: String,
    pub can_process: bool,
    pub can_cancel: bool,
    /// Label of the status a `process` call moves to.
    pub next_status: Option<&'static str>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        let user = order.user_details.as_ref();
        Self {
            id: order.id.to_string(),
            code: order.order_code.clone(),
            status: status_name(order),
            status_class: badge_class(order.status_code()),
            status_message: order.status_message(),
            date: order.placed_at().map(format_datetime).unwrap_or_default(),
            customer_name: user.map(|u| u.display_name().to_string()).unwrap_or_default(),
            customer_email: user.map(|u| u.email.clone()).unwrap_or_default(),
            customer_phone: user
                .and_then(|u| u.phone_number.clone())
                .unwrap_or_default(),
            customer_id: order.user.map(|u| u.to_string()).unwrap_or_default(),
            delivery_address: order
                .delivery_address_details
                .as_ref()
                .map(boutique_core::DeliveryAddress::one_line)
                .unwrap_or_default(),
            shipping_method: order
                .shipping_method_details
                .as_ref()
                .map(|m| m.method_name.clone())
                .unwrap_or_default(),
            payment_method: order
                .payment_method_details
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            customer_note: order.customer_note.clone().unwrap_or_default(),
            admin_note: order.admin_note.clone().unwrap_or_default(),
            items: order.order_items.iter().map(ItemView::from).collect(),
            item_count: order.item_count(),
            items_total: order.items_total().format(),
            shipping_fee: order.shipping_fee.format(),
            tax_amount: order.tax_amount.format(),
            discount_amount: order.discount_amount.format(),
            final_amount: order.final_amount.format(),
            can_process: order.can_process(),
            can_cancel: order.can_cancel(),
            next_status: order.status().and_then(OrderStatus::next).map(OrderStatus::label),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: &str) -> Order {
        serde_json::from_str(&format!(
            r#"{{"id": 9, "order_code": "ORD-0009", "final_amount": "450000.00",
                "shipping_fee": 30000,
                "current_status_details": {{"id": 1, "status_code": "{status}", "status_name": "Pending"}},
                "order_items": [
                    {{"id": 1, "quantity": 2, "price_at_purchase": "200000.00", "product_name": "Tee",
                      "size": "M", "color": "Black"}}
                ]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_pending_order_detail() {
        let view = OrderDetailView::from(&order("PENDING"));
        assert_eq!(view.status_message, "Order is being processed");
        assert!(view.can_process);
        assert!(view.can_cancel);
        assert_eq!(view.next_status, Some("Packed"));
        assert_eq!(view.items_total, "400.000 đ");
        assert_eq!(view.final_amount, "450.000 đ");
        assert_eq!(view.items.first().map(|i| i.variant.as_str()), Some("M / Black"));
    }

    #[test]
    fn test_delivered_order_has_no_actions() {
        let view = OrderDetailView::from(&order("DELIVERED"));
        assert!(!view.can_process);
        assert!(!view.can_cancel);
        assert_eq!(view.next_status, None);
        assert_eq!(view.status_class, "badge-success");
    }

    #[test]
    fn test_query_params_carry_filters() {
        let query = OrdersQuery {
            status: Some("PACKED".into()),
            ..OrdersQuery::default()
        };
        let params = query.params();
        assert_eq!(params.first().map(|(_, v)| v.as_str()), Some("PACKED"));
        assert_eq!(OrdersQuery::value(Some(&"  ".to_string())), None);
    }

    #[test]
    fn test_search_matches_code_and_customer() {
        let mut placed = order("PENDING");
        placed.user_details = serde_json::from_str(
            r#"{"id": 12, "name": "Nguyễn Mai Anh", "email": "mai@gmail.com"}"#,
        )
        .unwrap();

        assert!(matches_search(&placed, "ord-0009"));
        assert!(matches_search(&placed, " MAI ANH "));
        assert!(matches_search(&placed, "nguyễn"));
        assert!(matches_search(&placed, "gmail.com"));
        assert!(matches_search(&placed, ""));
        assert!(!matches_search(&placed, "ORD-0010"));

        // Guest orders only match on the code.
        assert!(!matches_search(&order("PENDING"), "mai"));
    }
}
