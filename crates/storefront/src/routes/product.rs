//! Product page and add to cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use boutique_core::{AddToCart, Product, Variant, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{parse_opt, report};
use crate::backend;
use crate::components::PageContext;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Selectable variant on the product page.
#[derive(Debug, Clone)]
pub struct VariantOption {
    pub id: String,
    pub label: String,
    pub color_hex: String,
    pub stock: i64,
    pub available: bool,
    pub image_url: String,
}

impl From<&Variant> for VariantOption {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id.to_string(),
            label: variant.label(),
            color_hex: variant
                .color_details
                .as_ref()
                .and_then(|c| c.hex_code.clone())
                .unwrap_or_default(),
            stock: variant.stock,
            available: variant.in_stock(),
            image_url: variant.image_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "product/show.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub price: String,
    pub list_price: Option<String>,
    pub discount_percent: i64,
    pub variants: Vec<VariantOption>,
    pub categories: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: Option<String>,
    pub quantity: Option<String>,
}

/// Validate an add-to-cart request against the product's variants.
///
/// # Errors
///
/// Returns the toast text when the quantity is below one, no variant was
/// picked, the variant is unknown or inactive, or the request exceeds stock.
pub fn check_add(
    variants: &[Variant],
    variant: Option<VariantId>,
    quantity: Option<i32>,
) -> std::result::Result<AddToCart, &'static str> {
    let quantity = quantity.unwrap_or(1);
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    let Some(variant) = variant else {
        return Err("Please select both color and size before adding to cart.");
    };
    let Some(selected) = variants.iter().find(|v| v.id == variant) else {
        return Err("Selected variant is not available.");
    };
    if !selected.is_active {
        return Err("Selected variant is not available.");
    }
    if i64::from(quantity) > selected.stock {
        return Err("Out of stock");
    }
    Ok(AddToCart {
        variant: selected.id,
        quantity,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/productdetail/{slug}", get(show).post(add_to_cart))
}

#[instrument(skip(state, session, auth))]
async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<ProductTemplate> {
    let api = state.api();
    let (product, variants, categories) = tokio::try_join!(
        backend::catalog::product(api, &slug),
        backend::catalog::variants(api, &slug),
        backend::catalog::product_categories(api, &slug),
    )?;

    Ok(ProductTemplate {
        ctx: PageContext::new(
            &session,
            auth.as_ref().map(|a| &a.customer),
            format!("/productdetail/{slug}"),
        )
        .await,
        price: product.effective_price().format(),
        list_price: product.is_on_sale().then(|| product.price.format()),
        discount_percent: product.discount_percent(),
        variants: variants.items().iter().map(VariantOption::from).collect(),
        categories: categories
            .items()
            .iter()
            .map(|c| (c.id.to_string(), c.name.clone()))
            .collect(),
        product,
    })
}

#[instrument(skip(state, auth, form))]
async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(slug): Path<String>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let back = format!("/productdetail/{slug}");
    let variants = backend::catalog::variants(state.api(), &slug).await?;

    let body = match check_add(
        variants.items(),
        parse_opt(form.variant_id.as_deref()),
        parse_opt(form.quantity.as_deref()),
    ) {
        Ok(body) => body,
        Err(message) => {
            auth.flash(Flash::error(message)).await;
            return Ok(Redirect::to(&back));
        }
    };

    add_breadcrumb(
        "cart",
        "add to cart",
        &[
            ("variant", body.variant.to_string()),
            ("quantity", body.quantity.to_string()),
        ],
    );
    let result = auth
        .call(|t| backend::cart::add(auth.api(), t, &body))
        .await;
    let added = report(
        &auth,
        result,
        "Product added to cart successfully!",
        "Failed to add product to cart.",
    )
    .await?;

    Ok(Redirect::to(if added.is_some() { "/cart" } else { back.as_str() }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variants() -> Vec<Variant> {
        serde_json::from_str(
            r#"[
                {"id": 1, "product": 7, "sku": "TEE-S", "stock": 3},
                {"id": 2, "product": 7, "sku": "TEE-M", "stock": 0},
                {"id": 3, "product": 7, "sku": "TEE-L", "stock": 9, "is_active": false}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_check_add_accepts_stocked_variant() {
        let body = check_add(&variants(), Some(VariantId::new(1)), Some(2)).unwrap();
        assert_eq!(
            body,
            AddToCart {
                variant: VariantId::new(1),
                quantity: 2
            }
        );
        // Quantity defaults to one.
        assert!(check_add(&variants(), Some(VariantId::new(1)), None).is_ok());
    }

    #[test]
    fn test_check_add_messages() {
        let all = variants();
        assert_eq!(
            check_add(&all, Some(VariantId::new(1)), Some(0)),
            Err("Quantity must be at least 1")
        );
        assert_eq!(
            check_add(&all, Some(VariantId::new(1)), Some(4)),
            Err("Out of stock")
        );
        assert_eq!(
            check_add(&all, Some(VariantId::new(2)), Some(1)),
            Err("Out of stock")
        );
        assert_eq!(
            check_add(&all, Some(VariantId::new(3)), Some(1)),
            Err("Selected variant is not available.")
        );
        assert_eq!(
            check_add(&all, Some(VariantId::new(99)), Some(1)),
            Err("Selected variant is not available.")
        );
        assert_eq!(
            check_add(&all, None, Some(1)),
            Err("Please select both color and size before adding to cart.")
        );
    }
}
