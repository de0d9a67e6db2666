//! Sale promotions and what they apply to.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, RawForm},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{
    Category, CategoryId, ProductFilter, ProductId, Promotion, PromotionAssignment, PromotionId,
    PromotionInput, PromotionType, format_datetime, to_datetime_local,
};
use serde::Deserialize;
use tracing::instrument;

use super::coupons::{TypeOption, parse_datetime_local, type_options};
use super::{parse_amount, parse_opt, report};
use crate::backend;
use crate::components::data_table::sales_table_config;
use crate::components::{DataTableConfig, PageContext};
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdminAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Sale row and edit-form prefill.
#[derive(Debug, Clone)]
pub struct SaleView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub value: i64,
    pub value_label: String,
    pub min_order_amount: String,
    pub max_discount_amount: String,
    pub usage_limit: String,
    pub current_usage: i32,
    pub priority: i32,
    pub start_date: String,
    pub end_date: String,
    pub start_input: String,
    pub end_input: String,
    pub product_count: usize,
    pub category_count: usize,
    pub active: bool,
}

impl From<&Promotion> for SaleView {
    fn from(sale: &Promotion) -> Self {
        Self {
            id: sale.id.to_string(),
            name: sale.name.clone(),
            description: sale.description.clone().unwrap_or_default(),
            kind: sale.kind.as_str(),
            kind_label: sale.kind.label(),
            value: sale.value,
            value_label: sale.value_label(),
            min_order_amount: sale
                .min_order_amount
                .map(|v| v.amount().to_string())
                .unwrap_or_default(),
            max_discount_amount: sale
                .max_discount_amount
                .map(|v| v.amount().to_string())
                .unwrap_or_default(),
            usage_limit: sale.usage_limit.map(|v| v.to_string()).unwrap_or_default(),
            current_usage: sale.current_usage,
            priority: sale.priority,
            start_date: format_datetime(&sale.start_date),
            end_date: format_datetime(&sale.end_date),
            start_input: to_datetime_local(&sale.start_date),
            end_input: to_datetime_local(&sale.end_date),
            product_count: sale.applied_product_ids.len(),
            category_count: sale.applied_category_ids.len(),
            active: sale.is_active,
        }
    }
}

/// Checkbox row in the assignment picker.
#[derive(Debug, Clone)]
pub struct PickRow {
    pub id: String,
    pub label: String,
    pub detail: String,
    pub assigned: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "sales/index.html")]
pub struct SalesTemplate {
    pub ctx: PageContext,
    pub table: DataTableConfig,
    pub rows: Vec<SaleView>,
    pub types: Vec<TypeOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "sales/show.html")]
pub struct SaleTemplate {
    pub ctx: PageContext,
    pub sale: SaleView,
    pub types: Vec<TypeOption>,
    pub products: Vec<PickRow>,
    pub categories: Vec<PickRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "sales/products.html")]
pub struct SaleProductsTemplate {
    pub ctx: PageContext,
    pub sale: SaleView,
    pub search: String,
    pub products: Vec<PickRow>,
    pub categories: Vec<PickRow>,
}

#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    pub search: Option<String>,
}

/// Create and edit form.
#[derive(Debug, Deserialize)]
pub struct SaleForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub min_order_amount: Option<String>,
    #[serde(default)]
    pub max_discount_amount: Option<String>,
    #[serde(default)]
    pub usage_limit: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl SaleForm {
    fn input(&self) -> std::result::Result<PromotionInput, String> {
        let (Some(start_date), Some(end_date)) = (
            parse_datetime_local(&self.start_date),
            parse_datetime_local(&self.end_date),
        ) else {
            return Err("Please choose a start and end date".to_string());
        };
        let kind = self
            .kind
            .parse::<PromotionType>()
            .map_err(|_| "Please choose a sale type".to_string())?;

        PromotionInput {
            name: self.name.clone(),
            description: self.description.trim().to_string(),
            kind,
            value: parse_amount(self.value.as_deref()).unwrap_or(0),
            start_date,
            end_date,
            max_discount_amount: parse_amount(self.max_discount_amount.as_deref()),
            min_order_amount: parse_amount(self.min_order_amount.as_deref()),
            usage_limit: parse_opt(self.usage_limit.as_deref()),
            priority: parse_opt(self.priority.as_deref()).unwrap_or(0),
            is_active: self.is_active.is_some(),
        }
        .normalized()
        .map_err(|e| e.to_string())
    }
}

/// Whether the picker form adds or removes its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssignAction {
    Assign,
    Remove,
}

/// Decode the picker form. Checkboxes repeat `product_ids` and
/// `category_ids`, which the plain `Form` extractor cannot collect.
fn parse_assignment(id: PromotionId, body: &[u8]) -> (AssignAction, PromotionAssignment) {
    let mut action = AssignAction::Assign;
    let mut assignment = PromotionAssignment {
        promotion_id: id,
        product_ids: Vec::new(),
        category_ids: Vec::new(),
    };
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "action" if value == "remove" => action = AssignAction::Remove,
            "product_ids" => assignment.product_ids.extend(value.parse::<ProductId>().ok()),
            "category_ids" => assignment
                .category_ids
                .extend(value.parse::<CategoryId>().ok()),
            _ => {}
        }
    }
    (action, assignment)
}

fn category_rows(categories: &[Category], assigned: &HashSet<CategoryId>) -> Vec<PickRow> {
    Category::flatten(categories)
        .into_iter()
        .map(|(depth, c)| PickRow {
            id: c.id.to_string(),
            label: format!("{}{}", "— ".repeat(depth), c.name),
            detail: c.slug.clone().unwrap_or_default(),
            assigned: assigned.contains(&c.id),
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(index).post(create))
        .route("/sales/{id}", get(show).post(update))
        .route("/sales/{id}/products", get(products).post(assign))
        .route("/sales/{id}/delete", post(delete))
}

#[instrument(skip(auth))]
async fn index(RequireAdminAuth(auth): RequireAdminAuth) -> Result<SalesTemplate> {
    let sales = auth
        .call(|t| backend::promotions::list(auth.api(), t))
        .await?;
    Ok(SalesTemplate {
        ctx: PageContext::new(&auth, "/sales").await,
        table: sales_table_config(),
        rows: sales.items().iter().map(SaleView::from).collect(),
        types: type_options(),
    })
}

async fn rejected(auth: &AdminSession, message: String, to: &str) -> Redirect {
    auth.flash(Flash::error(message)).await;
    Redirect::to(to)
}

#[instrument(skip(auth, form))]
async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    Form(form): Form<SaleForm>,
) -> Result<Redirect> {
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&auth, message, "/sales").await),
    };
    let result = auth
        .call(|t| backend::promotions::create(auth.api(), t, &input))
        .await;
    let created = report(&auth, result, "Sale created successfully", "Error creating sale").await?;
    Ok(match created {
        Some(sale) => Redirect::to(&format!("/sales/{}/products", sale.id)),
        None => Redirect::to("/sales"),
    })
}

/// Edit form plus what the sale currently applies to.
#[instrument(skip(auth))]
async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<PromotionId>,
) -> Result<SaleTemplate> {
    let (sale, categories) = tokio::try_join!(
        auth.call(|t| backend::promotions::get(auth.api(), t, id)),
        auth.call(|t| backend::categories::list(auth.api(), t, None)),
    )?;

    let mut products = Vec::with_capacity(sale.applied_product_ids.len());
    for product_id in &sale.applied_product_ids {
        let product = auth
            .call(|t| backend::products::get(auth.api(), t, *product_id))
            .await?;
        products.push(PickRow {
            id: product.id.to_string(),
            label: product.name.clone(),
            detail: product.price.format(),
            assigned: true,
        });
    }

    let assigned: HashSet<CategoryId> = sale.applied_category_ids.iter().copied().collect();
    let categories = category_rows(categories.items(), &assigned)
        .into_iter()
        .filter(|row| row.assigned)
        .collect();

    Ok(SaleTemplate {
        ctx: PageContext::new(&auth, "/sales").await,
        sale: SaleView::from(&sale),
        types: type_options(),
        products,
        categories,
    })
}

#[instrument(skip(auth, form))]
async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<PromotionId>,
    Form(form): Form<SaleForm>,
) -> Result<Redirect> {
    let back = format!("/sales/{id}");
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&auth, message, &back).await),
    };
    let result = auth
        .call(|t| backend::promotions::update(auth.api(), t, id, &input))
        .await;
    report(&auth, result, "Sale updated successfully", "Error updating sale").await?;
    Ok(Redirect::to(&back))
}

#[instrument(skip(auth))]
async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<PromotionId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::promotions::delete(auth.api(), t, id))
        .await;
    let deleted = report(&auth, result, "Sale deleted successfully", "Error deleting sale").await?;
    Ok(match deleted {
        Some(()) => Redirect::to("/sales"),
        None => Redirect::to(&format!("/sales/{id}")),
    })
}

/// Product and category picker.
#[instrument(skip(auth))]
async fn products(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<PromotionId>,
    Query(query): Query<PickerQuery>,
) -> Result<SaleProductsTemplate> {
    let search = query.search.unwrap_or_default();
    let filter = ProductFilter {
        search: Some(search.clone()),
        ..ProductFilter::default()
    };
    let (sale, catalog, categories) = tokio::try_join!(
        auth.call(|t| backend::promotions::get(auth.api(), t, id)),
        auth.call(|t| backend::products::list(auth.api(), t, &filter)),
        auth.call(|t| backend::categories::list(auth.api(), t, None)),
    )?;

    let assigned_products: HashSet<ProductId> = sale.applied_product_ids.iter().copied().collect();
    let assigned_categories: HashSet<CategoryId> =
        sale.applied_category_ids.iter().copied().collect();

    Ok(SaleProductsTemplate {
        ctx: PageContext::new(&auth, "/sales").await,
        sale: SaleView::from(&sale),
        search,
        products: catalog
            .items()
            .iter()
            .map(|p| PickRow {
                id: p.id.to_string(),
                label: p.name.clone(),
                detail: p.price.format(),
                assigned: assigned_products.contains(&p.id),
            })
            .collect(),
        categories: category_rows(categories.items(), &assigned_categories),
    })
}

/// Attach or detach the checked products and categories.
#[instrument(skip(auth, body))]
async fn assign(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<PromotionId>,
    RawForm(body): RawForm,
) -> Result<Redirect> {
    let back = format!("/sales/{id}/products");
    let (action, assignment) = parse_assignment(id, &body);
    if assignment.is_empty() {
        return Ok(rejected(&auth, "Please select at least one product or category".into(), &back).await);
    }

    match action {
        AssignAction::Assign => {
            let result = auth
                .call(|t| backend::promotions::assign(auth.api(), t, &assignment))
                .await;
            report(&auth, result, "Added to sale successfully", "Error adding to sale").await?;
        }
        AssignAction::Remove => {
            let result = auth
                .call(|t| backend::promotions::remove(auth.api(), t, &assignment))
                .await;
            report(&auth, result, "Removed from sale successfully", "Error removing from sale")
                .await?;
        }
    }
    Ok(Redirect::to(&back))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_collects_repeated_fields() {
        let body = b"action=assign&product_ids=3&product_ids=9&category_ids=2&product_ids=x";
        let (action, assignment) = parse_assignment(PromotionId::new(5), body);
        assert_eq!(action, AssignAction::Assign);
        assert_eq!(assignment.promotion_id, PromotionId::new(5));
        assert_eq!(assignment.product_ids, vec![ProductId::new(3), ProductId::new(9)]);
        assert_eq!(assignment.category_ids, vec![CategoryId::new(2)]);
    }

    #[test]
    fn test_parse_assignment_remove_action() {
        let (action, assignment) = parse_assignment(PromotionId::new(1), b"action=remove");
        assert_eq!(action, AssignAction::Remove);
        assert!(assignment.is_empty());
    }

    #[test]
    fn test_sale_form_defaults() {
        let form = SaleForm {
            name: "  Tet sale ".into(),
            description: String::new(),
            kind: "fixed".into(),
            value: Some("50.000".into()),
            min_order_amount: None,
            max_discount_amount: None,
            usage_limit: Some(String::new()),
            priority: None,
            start_date: "2025-01-20T00:00".into(),
            end_date: "2025-02-05T23:59".into(),
            is_active: None,
        };
        let input = form.input().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(input.name, "Tet sale");
        assert_eq!(input.kind, PromotionType::Fixed);
        assert_eq!(input.value, 50_000);
        assert_eq!(input.priority, 0);
        assert_eq!(input.usage_limit, None);
        assert!(!input.is_active);
    }
}
