//! Shopping cart.

use serde::{Deserialize, Serialize};

use super::catalog::Variant;
use crate::types::{CartItemId, VariantId, Vnd};

/// A line in the signed-in customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub variant_details: Option<Variant>,
    pub quantity: i32,
    #[serde(default)]
    pub item_total_price: Option<Vnd>,
    /// Other variants of the same product the line can be switched to.
    #[serde(default)]
    pub available_variants: Vec<Variant>,
}

impl CartItem {
    /// Line total, computed from the nested product price when the backend omits it.
    #[must_use]
    pub fn total(&self) -> Vnd {
        self.item_total_price.unwrap_or_else(|| {
            self.variant_details
                .as_ref()
                .and_then(Variant::unit_price)
                .unwrap_or_default()
                .times(self.quantity)
        })
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        self.variant_details
            .as_ref()
            .and_then(|v| v.product_details.as_ref())
            .map_or("", |p| p.name.as_str())
    }
}

/// Body of `POST /cart/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddToCart {
    pub variant: VariantId,
    pub quantity: i32,
}

/// Body of `PUT /cart/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetQuantity {
    pub quantity: i32,
}

/// Body of `PATCH /cart/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeVariant {
    pub new_variant_id: VariantId,
}

/// Body of `DELETE /cart/bulk-delete/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDelete {
    pub cart_item_ids: Vec<CartItemId>,
}

/// Sum of the given cart lines.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Vnd {
    items.iter().map(CartItem::total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_totals() {
        let json = r#"[
            {"id": 1, "quantity": 2, "item_total_price": 300000,
             "variant_details": {"id": 4, "product": 7, "sku": "TEE-M",
                "product_details": {"id": 7, "name": "Tee", "slug": "tee", "price": 150000}}},
            {"id": 2, "quantity": 3,
             "variant_details": {"id": 5, "product": 8, "sku": "CAP",
                "product_details": {"id": 8, "name": "Cap", "slug": "cap",
                    "price": 100000, "sale_price": 80000}}}
        ]"#;
        let items: Vec<CartItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[1].total(), Vnd::new(240_000));
        assert_eq!(items[1].product_name(), "Cap");
        assert_eq!(cart_total(&items), Vnd::new(540_000));
    }
}
