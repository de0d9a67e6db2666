//! Product management: grid, create, edit, variants.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Multipart, Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::client::MultipartBody;
use boutique_core::{
    NewSupplier, Product, ProductFilter, ProductId, ProductInput, Supplier, SupplierStatus,
    Variant, VariantId, VariantInput,
};
use serde::Deserialize;
use tracing::instrument;

use super::categories::{CategoryOption, category_options};
use super::{MultipartForm, parse_amount, parse_opt, report};
use crate::backend;
use crate::components::data_table::products_table_config;
use crate::components::{DataTableConfig, FilterOption, PageContext, Pagination};
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdminAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Multipart field carrying the product or variant image.
const IMAGE_FIELD: &str = "image_url";

// =============================================================================
// Views
// =============================================================================

/// Product grid row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub categories: String,
    pub price: String,
    pub sale_price: String,
    pub stock: i64,
    pub published: bool,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            categories: product
                .categories
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            price: product.price.format(),
            sale_price: if product.is_on_sale() {
                product.sale_price.format()
            } else {
                String::new()
            },
            stock: product.stock,
            published: product.is_published,
        }
    }
}

/// Values of the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost_price: String,
    pub price: String,
    pub sale_price: String,
    pub supplier: String,
    pub category: String,
    pub publish_at: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            cost_price: product.cost_price.amount().to_string(),
            price: product.price.amount().to_string(),
            sale_price: product.sale_price.amount().to_string(),
            supplier: product
                .supplier_details
                .as_ref()
                .map(|s| s.id.to_string())
                .unwrap_or_default(),
            category: product
                .categories
                .last()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
            publish_at: product
                .publish_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Supplier `<option>`.
#[derive(Debug, Clone)]
pub struct SupplierOption {
    pub id: String,
    pub name: String,
}

impl From<&Supplier> for SupplierOption {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id.to_string(),
            name: supplier.company_name.clone(),
        }
    }
}

/// Variant table row.
#[derive(Debug, Clone)]
pub struct VariantRow {
    pub id: String,
    pub sku: String,
    pub size: String,
    pub color: String,
    pub hex_code: String,
    pub stock: i64,
    pub weight: String,
    pub active: bool,
    pub image_url: Option<String>,
}

impl From<&Variant> for VariantRow {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id.to_string(),
            sku: variant.sku.clone(),
            size: variant
                .size_details
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            color: variant
                .color_details
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            hex_code: variant
                .color_details
                .as_ref()
                .and_then(|c| c.hex_code.clone())
                .unwrap_or_default(),
            stock: variant.stock,
            weight: variant
                .weight_grams
                .map(|w| format!("{w} g"))
                .unwrap_or_default(),
            active: variant.is_active,
            image_url: variant.image_url.clone(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub ctx: PageContext,
    pub table: DataTableConfig,
    pub rows: Vec<ProductRow>,
    pub pagination: Pagination,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub ctx: PageContext,
    /// Blank values for the shared form fields.
    pub product: ProductFormView,
    pub categories: Vec<CategoryOption>,
    pub suppliers: Vec<SupplierOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: ProductFormView,
    pub variants: Vec<VariantRow>,
    pub categories: Vec<CategoryOption>,
    pub suppliers: Vec<SupplierOption>,
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}

/// Inline supplier form on the create page.
#[derive(Debug, Deserialize)]
pub struct SupplierForm {
    pub company_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub website: String,
}

impl From<SupplierForm> for NewSupplier {
    fn from(form: SupplierForm) -> Self {
        Self {
            company_name: form.company_name.trim().to_string(),
            contact_person: form.contact_person,
            email: form.email,
            phone_number: form.phone_number,
            address: form.address,
            tax_id: form.tax_id,
            status: parse_opt(form.status.as_deref()).unwrap_or(SupplierStatus::Active),
            website: form.website,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VariantDeleteForm {
    pub product_id: ProductId,
}

fn product_input(form: &MultipartForm) -> ProductInput {
    ProductInput {
        name: form.text_or_empty("name"),
        description: form.text_or_empty("description"),
        cost_price: parse_amount(form.text("cost_price")),
        price: parse_amount(form.text("price")),
        sale_price: parse_amount(form.text("sale_price")),
        supplier: parse_opt(form.text("supplier")),
        category_id: parse_opt(form.text("category_id")),
        publish_at: parse_opt(form.text("publish_at")),
    }
}

/// New products need every field and an image.
fn is_complete(input: &ProductInput, has_image: bool) -> bool {
    !input.name.is_empty()
        && !input.description.is_empty()
        && input.cost_price.is_some_and(|p| p > 0)
        && input.price.is_some_and(|p| p > 0)
        && input.supplier.is_some()
        && input.category_id.is_some()
        && has_image
}

fn variant_input(product: ProductId, form: &MultipartForm) -> VariantInput {
    VariantInput {
        product,
        size: parse_opt(form.text("size")),
        color: parse_opt(form.text("color")),
        sku: form.text_or_empty("sku"),
        stock: parse_opt(form.text("stock")).unwrap_or_default(),
        weight_grams: parse_opt(form.text("weight_grams")),
        is_active: form
            .text("is_active")
            .is_some_and(|v| matches!(v, "on" | "true")),
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index))
        .route("/products/add", get(new_product).post(create))
        .route("/products/add/supplier", post(create_supplier))
        .route("/products/{id}", get(show).post(update))
        .route("/products/{id}/delete", post(delete))
        .route("/products/{id}/variants", post(create_variant))
        .route("/variants/{id}/delete", post(delete_variant))
}

/// Product grid.
#[instrument(skip(auth))]
async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<ProductsQuery>,
) -> Result<ProductsTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let filter = ProductFilter {
        search: query.search.clone(),
        category: parse_opt(query.category.as_deref()),
        page: Some(page),
        ..ProductFilter::default()
    };

    let (products, categories) = tokio::try_join!(
        auth.call(|t| backend::products::list(auth.api(), t, &filter)),
        auth.call(|t| backend::categories::list(auth.api(), t, None)),
    )?;

    let category_filter = category_options(categories.items())
        .into_iter()
        .map(|o| FilterOption::new(o.id, o.label))
        .collect();
    let params = [
        ("search", query.search.unwrap_or_default()),
        ("category", query.category.unwrap_or_default()),
    ];

    Ok(ProductsTemplate {
        ctx: PageContext::new(&auth, "/products").await,
        table: products_table_config(category_filter).with_values(&params),
        rows: products.items().iter().map(ProductRow::from).collect(),
        pagination: Pagination::new(
            "/products",
            &params,
            page,
            products.total(),
            products.has_next(),
        ),
    })
}

async fn pickers(auth: &AdminSession) -> Result<(Vec<CategoryOption>, Vec<SupplierOption>)> {
    let (categories, suppliers) = tokio::try_join!(
        auth.call(|t| backend::categories::list(auth.api(), t, None)),
        auth.call(|t| backend::suppliers::list(auth.api(), t)),
    )?;
    Ok((
        category_options(categories.items()),
        suppliers.items().iter().map(SupplierOption::from).collect(),
    ))
}

/// Create form.
#[instrument(skip(auth))]
async fn new_product(RequireAdminAuth(auth): RequireAdminAuth) -> Result<NewProductTemplate> {
    let (categories, suppliers) = pickers(&auth).await?;
    Ok(NewProductTemplate {
        ctx: PageContext::new(&auth, "/products").await,
        product: ProductFormView::default(),
        categories,
        suppliers,
    })
}

#[instrument(skip_all)]
async fn create(RequireAdminAuth(auth): RequireAdminAuth, multipart: Multipart) -> Result<Redirect> {
    let form = MultipartForm::read(multipart, IMAGE_FIELD, IMAGE_FIELD).await?;
    let input = product_input(&form);
    if !is_complete(&input, form.file.is_some()) {
        auth.flash(Flash::error("Please fill in all fields")).await;
        return Ok(Redirect::to("/products/add"));
    }

    let body = MultipartBody::new(input.form_fields()).with_file(form.file);
    let result = auth
        .call(|t| backend::products::create(auth.api(), t, &body))
        .await;
    let created = report(
        &auth,
        result,
        "Product created successfully",
        "Error creating product",
    )
    .await?;

    // New products open on their detail page, ready for variants.
    Ok(match created {
        Some(product) => Redirect::to(&format!("/products/{}#variants", product.id)),
        None => Redirect::to("/products/add"),
    })
}

#[instrument(skip(auth, form))]
async fn create_supplier(
    RequireAdminAuth(auth): RequireAdminAuth,
    Form(form): Form<SupplierForm>,
) -> Result<Redirect> {
    let supplier = NewSupplier::from(form);
    if supplier.company_name.is_empty() {
        auth.flash(Flash::error("Please enter a company name")).await;
        return Ok(Redirect::to("/products/add"));
    }

    let result = auth
        .call(|t| backend::suppliers::create(auth.api(), t, &supplier))
        .await;
    report(
        &auth,
        result,
        "Create supplier successfully",
        "Error creating supplier",
    )
    .await?;
    Ok(Redirect::to("/products/add"))
}

/// Product detail with variants.
#[instrument(skip(auth))]
async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductTemplate> {
    let (product, variants, (categories, suppliers)) = tokio::try_join!(
        auth.call(|t| backend::products::get(auth.api(), t, id)),
        auth.call(|t| backend::products::variants(auth.api(), t, id)),
        pickers(&auth),
    )?;

    Ok(ProductTemplate {
        ctx: PageContext::new(&auth, "/products").await,
        product: ProductFormView::from(&product),
        variants: variants.items().iter().map(VariantRow::from).collect(),
        categories,
        suppliers,
    })
}

#[instrument(skip(auth, multipart))]
async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = MultipartForm::read(multipart, IMAGE_FIELD, IMAGE_FIELD).await?;
    let body = MultipartBody::new(product_input(&form).form_fields()).with_file(form.file);

    let result = auth
        .call(|t| backend::products::update(auth.api(), t, id, &body))
        .await;
    report(
        &auth,
        result,
        "Product updated successfully",
        "Error updating product",
    )
    .await?;
    Ok(Redirect::to(&format!("/products/{id}")))
}

#[instrument(skip(auth))]
async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::products::delete(auth.api(), t, id))
        .await;
    let deleted = report(
        &auth,
        result,
        "Product deleted successfully",
        "Error deleting product",
    )
    .await?;

    Ok(match deleted {
        Some(()) => Redirect::to("/products"),
        None => Redirect::to(&format!("/products/{id}")),
    })
}

#[instrument(skip(auth, multipart))]
async fn create_variant(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let back = format!("/products/{id}#variants");
    let form = MultipartForm::read(multipart, IMAGE_FIELD, IMAGE_FIELD).await?;
    let input = variant_input(id, &form);
    if input.sku.is_empty() {
        auth.flash(Flash::error("Please enter a SKU")).await;
        return Ok(Redirect::to(&back));
    }

    let body = MultipartBody::new(input.form_fields()).with_file(form.file);
    let result = auth
        .call(|t| backend::products::create_variant(auth.api(), t, id, &body))
        .await;
    report(
        &auth,
        result,
        "Variant created successfully",
        "Error creating variant",
    )
    .await?;
    Ok(Redirect::to(&back))
}

#[instrument(skip(auth, form))]
async fn delete_variant(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<VariantId>,
    Form(form): Form<VariantDeleteForm>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::products::delete_variant(auth.api(), t, id))
        .await;
    report(
        &auth,
        result,
        "Variant deleted successfully",
        "Error deleting variant",
    )
    .await?;
    Ok(Redirect::to(&format!("/products/{}#variants", form.product_id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            file: None,
        }
    }

    #[test]
    fn test_product_input_from_form() {
        let input = product_input(&form(&[
            ("name", " Linen shirt "),
            ("description", "Breathable"),
            ("cost_price", "200.000"),
            ("price", "350000"),
            ("sale_price", ""),
            ("supplier", "2"),
            ("category_id", "7"),
            ("publish_at", "2025-04-01"),
        ]));
        assert_eq!(input.name, "Linen shirt");
        assert_eq!(input.cost_price, Some(200_000));
        assert_eq!(input.price, Some(350_000));
        assert_eq!(input.sale_price, None);
        assert!(is_complete(&input, true));
        assert!(!is_complete(&input, false));
        assert_eq!(input.publish_at.map(|d| d.to_string()).as_deref(), Some("2025-04-01"));
    }

    #[test]
    fn test_incomplete_product_is_rejected() {
        let input = product_input(&form(&[("name", "Cap"), ("price", "90000")]));
        assert!(!is_complete(&input, true));
    }

    #[test]
    fn test_update_keeps_prices_left_blank() {
        let input = product_input(&form(&[
            ("name", "Linen shirt"),
            ("cost_price", ""),
            ("price", " "),
            ("sale_price", "299000"),
        ]));
        assert_eq!(input.cost_price, None);
        assert_eq!(input.price, None);
        let fields = input.form_fields();
        assert!(!fields.iter().any(|(k, _)| *k == "cost_price" || *k == "price"));
        assert!(fields.contains(&("sale_price", "299000".to_string())));
    }

    #[test]
    fn test_variant_input_checkbox() {
        let input = variant_input(
            ProductId::new(3),
            &form(&[("sku", "TS-M-BLK"), ("size", "2"), ("stock", "12"), ("is_active", "on")]),
        );
        assert!(input.is_active);
        assert_eq!(input.stock, 12);
        assert!(input.color.is_none());

        let inactive = variant_input(ProductId::new(3), &form(&[("sku", "X")]));
        assert!(!inactive.is_active);
    }

    #[test]
    fn test_product_row_hides_non_sale_price() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "name": "Tee", "slug": "tee", "price": "150000.00", "sale_price": 0,
                "categories": [{"id": 1, "name": "Tops"}, {"id": 2, "name": "Basics"}]}"#,
        )
        .unwrap();
        let row = ProductRow::from(&product);
        assert_eq!(row.price, "150.000 đ");
        assert_eq!(row.sale_price, "");
        assert_eq!(row.categories, "Tops, Basics");
    }
}
