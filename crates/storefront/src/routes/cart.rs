//! Cart page and line edits.
//!
//! The cart lives in the commerce API. Quantity steps are checked against the
//! line's current quantity and stock before anything is sent.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, RawForm},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::client::ApiError;
use boutique_core::{CartItem, CartItemId, ChangeVariant, Vnd, VariantId, cart_total};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{join_ids, parse_opt, repeated, report};
use crate::backend;
use crate::components::PageContext;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CustomerSession, RequireAuth};
use crate::models::Flash;
use crate::state::AppState;

/// A variant the line can be switched to.
#[derive(Debug, Clone)]
pub struct LineVariant {
    pub id: String,
    pub label: String,
    pub selected: bool,
    pub available: bool,
}

/// One cart line.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image_url: String,
    pub variant_label: String,
    pub unit_price: String,
    pub quantity: i32,
    pub stock: i64,
    pub total: String,
    pub variants: Vec<LineVariant>,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let variant = item.variant_details.as_ref();
        let current = variant.map(|v| v.id);
        let product = variant.and_then(|v| v.product_details.as_ref());
        Self {
            id: item.id.to_string(),
            name: item.product_name().to_string(),
            slug: product.map(|p| p.slug.clone()).unwrap_or_default(),
            image_url: variant
                .and_then(|v| v.image_url.clone())
                .or_else(|| product.and_then(|p| p.image_url.clone()))
                .unwrap_or_default(),
            variant_label: variant.map(|v| v.label()).unwrap_or_default(),
            unit_price: variant
                .and_then(|v| v.unit_price())
                .unwrap_or_default()
                .format(),
            quantity: item.quantity,
            stock: variant.map_or(0, |v| v.stock),
            total: item.total().format(),
            variants: item
                .available_variants
                .iter()
                .map(|v| LineVariant {
                    id: v.id.to_string(),
                    label: v.label(),
                    selected: Some(v.id) == current,
                    available: v.in_stock(),
                })
                .collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

/// Quantity stepper direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Increase,
    Decrease,
}

impl Step {
    const fn failure(self) -> &'static str {
        match self {
            Self::Increase => "Increase quantity of cart item failed",
            Self::Decrease => "Decrease quantity of cart item failed",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub step: Step,
}

#[derive(Debug, Deserialize)]
pub struct VariantForm {
    pub variant_id: Option<String>,
}

/// Quantity after one step, or the toast text explaining why not.
///
/// # Errors
///
/// Returns a message when the step would drop below one or exceed stock.
pub fn next_quantity(
    current: i32,
    stock: i64,
    step: Step,
) -> std::result::Result<i32, &'static str> {
    match step {
        Step::Increase if i64::from(current) + 1 > stock => Err("Out of stock"),
        Step::Increase => Ok(current + 1),
        Step::Decrease if current <= 1 => Err("Quantity must be at least 1"),
        Step::Decrease => Ok(current - 1),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show))
        .route("/cart/{id}/quantity", post(set_quantity))
        .route("/cart/{id}/variant", post(change_variant))
        .route("/cart/{id}/remove", post(remove))
        .route("/cart/remove-selected", post(remove_selected))
        .route("/cart/checkout", post(checkout))
}

#[instrument(skip_all)]
async fn show(RequireAuth(auth): RequireAuth) -> Result<CartTemplate> {
    let items = auth
        .call(|t| backend::cart::list(auth.api(), t))
        .await?
        .into_items();

    Ok(CartTemplate {
        ctx: PageContext::for_customer(&auth, "/cart").await,
        total: cart_total(&items).format(),
        lines: items.iter().map(CartLineView::from).collect(),
    })
}

async fn find_line(auth: &CustomerSession, id: CartItemId) -> Result<CartItem> {
    auth.call(|t| backend::cart::list(auth.api(), t))
        .await?
        .into_items()
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| AppError::NotFound(format!("cart item {id}")))
}

async fn back_to_cart(auth: &CustomerSession, message: &str) -> Redirect {
    auth.flash(Flash::error(message)).await;
    Redirect::to("/cart")
}

#[instrument(skip(auth, form))]
async fn set_quantity(
    RequireAuth(auth): RequireAuth,
    Path(id): Path<CartItemId>,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    let line = find_line(&auth, id).await?;
    let stock = line.variant_details.as_ref().map_or(0, |v| v.stock);
    let quantity = match next_quantity(line.quantity, stock, form.step) {
        Ok(quantity) => quantity,
        Err(message) => return Ok(back_to_cart(&auth, message).await),
    };

    // Steps succeed silently; only failures are reported.
    if let Err(err) = auth
        .call(|t| backend::cart::set_quantity(auth.api(), t, id, quantity))
        .await
    {
        if matches!(err, AppError::Api(ApiError::Unauthorized)) {
            return Err(err);
        }
        warn!(error = %err, "cart quantity update failed");
        return Ok(back_to_cart(&auth, form.step.failure()).await);
    }
    Ok(Redirect::to("/cart"))
}

#[instrument(skip(auth, form))]
async fn change_variant(
    RequireAuth(auth): RequireAuth,
    Path(id): Path<CartItemId>,
    Form(form): Form<VariantForm>,
) -> Result<Redirect> {
    let Some(variant) = parse_opt::<VariantId>(form.variant_id.as_deref()) else {
        return Ok(back_to_cart(&auth, "Selected variant is not available.").await);
    };
    let line = find_line(&auth, id).await?;
    match line.available_variants.iter().find(|v| v.id == variant) {
        None => return Ok(back_to_cart(&auth, "Selected variant is not available.").await),
        Some(target) if !target.is_active || target.stock < i64::from(line.quantity) => {
            return Ok(back_to_cart(&auth, "Out of stock").await);
        }
        Some(_) => {}
    }

    let body = ChangeVariant {
        new_variant_id: variant,
    };
    let result = auth
        .call(|t| backend::cart::change_variant(auth.api(), t, id, &body))
        .await;
    report(
        &auth,
        result,
        "Change variant of cart item success",
        "Change variant of cart item failed",
    )
    .await?;
    Ok(Redirect::to("/cart"))
}

#[instrument(skip(auth))]
async fn remove(RequireAuth(auth): RequireAuth, Path(id): Path<CartItemId>) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::cart::remove(auth.api(), t, id))
        .await;
    report(
        &auth,
        result,
        "Delete cart item success",
        "Delete cart item failed",
    )
    .await?;
    Ok(Redirect::to("/cart"))
}

#[instrument(skip_all)]
async fn remove_selected(
    RequireAuth(auth): RequireAuth,
    RawForm(body): RawForm,
) -> Result<Redirect> {
    let ids: Vec<CartItemId> = repeated(&body, "item_ids");
    if ids.is_empty() {
        return Ok(back_to_cart(&auth, "Please select at least one item to proceed.").await);
    }

    let result = auth
        .call(|t| backend::cart::bulk_delete(auth.api(), t, &ids))
        .await;
    report(
        &auth,
        result,
        "Delete cart item success",
        "Delete cart item failed",
    )
    .await?;
    Ok(Redirect::to("/cart"))
}

/// Carry the ticked lines over to the checkout page.
#[instrument(skip_all)]
async fn checkout(RequireAuth(auth): RequireAuth, RawForm(body): RawForm) -> Result<Redirect> {
    let ids: Vec<CartItemId> = repeated(&body, "item_ids");
    if ids.is_empty() {
        return Ok(back_to_cart(&auth, "Please select at least one item to proceed.").await);
    }
    Ok(Redirect::to(&format!("/checkout?items={}", join_ids(&ids))))
}

/// Sum of the selected lines, as shown before the quote arrives.
#[must_use]
pub fn selected_total(items: &[CartItem], selected: &[CartItemId]) -> Vnd {
    items
        .iter()
        .filter(|item| selected.contains(&item.id))
        .map(CartItem::total)
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_quantity_bounds() {
        assert_eq!(next_quantity(1, 5, Step::Increase), Ok(2));
        assert_eq!(next_quantity(5, 5, Step::Increase), Err("Out of stock"));
        assert_eq!(next_quantity(2, 5, Step::Decrease), Ok(1));
        assert_eq!(
            next_quantity(1, 5, Step::Decrease),
            Err("Quantity must be at least 1")
        );
    }

    #[test]
    fn test_line_view_marks_current_variant() {
        let item: CartItem = serde_json::from_str(
            r#"{"id": 11, "quantity": 2,
                "variant_details": {"id": 4, "product": 7, "sku": "TEE-M", "stock": 6,
                    "size_details": {"id": 2, "name": "M"},
                    "product_details": {"id": 7, "name": "Tee", "slug": "tee", "price": 150000}},
                "available_variants": [
                    {"id": 4, "product": 7, "sku": "TEE-M", "stock": 6, "size_details": {"id": 2, "name": "M"}},
                    {"id": 5, "product": 7, "sku": "TEE-L", "stock": 0, "size_details": {"id": 3, "name": "L"}}
                ]}"#,
        )
        .unwrap();
        let view = CartLineView::from(&item);
        assert_eq!(view.slug, "tee");
        assert_eq!(view.variant_label, "M");
        assert_eq!(view.total, Vnd::new(300_000).format());
        assert!(view.variants.iter().any(|v| v.selected && v.id == "4"));
        assert!(view.variants.iter().any(|v| !v.available && v.id == "5"));
        assert_eq!(
            selected_total(&[item], &[CartItemId::new(11)]),
            Vnd::new(300_000)
        );
    }
}
