//! Category management.
//!
//! Categories nest one level or more through `parent`; the list shows the
//! whole tree and the detail page edits one node and its children.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{Category, CategoryId, CategoryInput};
use serde::Deserialize;
use tracing::instrument;

use super::{parse_opt, report};
use crate::backend;
use crate::components::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Flash;
use crate::state::AppState;

/// One row of the category tree.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub depth: usize,
    pub children: usize,
}

impl CategoryRow {
    fn new(depth: usize, category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone().unwrap_or_default(),
            description: category.description.clone().unwrap_or_default(),
            depth,
            children: category.subcategories.len(),
        }
    }

    /// Indent class for the tree column; the stylesheet defines four levels.
    #[must_use]
    pub fn indent(&self) -> String {
        format!("depth-{}", self.depth.min(4))
    }
}

/// `<option>` for category pickers, indented by depth.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: String,
    pub label: String,
}

/// Flatten a category tree into picker options.
pub(crate) fn category_options(categories: &[Category]) -> Vec<CategoryOption> {
    Category::flatten(categories)
        .into_iter()
        .map(|(depth, c)| CategoryOption {
            id: c.id.to_string(),
            label: format!("{}{}", "— ".repeat(depth), c.name),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub ctx: PageContext,
    pub rows: Vec<CategoryRow>,
    pub parents: Vec<CategoryOption>,
    pub search: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryTemplate {
    pub ctx: PageContext,
    pub category: CategoryRow,
    pub subcategories: Vec<CategoryRow>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub search: Option<String>,
}

/// Create and edit form.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl CategoryForm {
    fn input(&self) -> CategoryInput {
        CategoryInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            parent: parse_opt(self.parent.as_deref()),
        }
    }
}

/// Outcome of checking an edit against the stored category.
#[derive(Debug, PartialEq, Eq)]
enum EditCheck {
    Unchanged,
    MissingName,
    Ok,
}

fn check_edit(current: &Category, input: &CategoryInput) -> EditCheck {
    if input.name == current.name
        && input.description == current.description.clone().unwrap_or_default()
    {
        EditCheck::Unchanged
    } else if input.name.is_empty() {
        EditCheck::MissingName
    } else {
        EditCheck::Ok
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", get(show).post(update))
        .route("/categories/{id}/delete", post(delete))
}

/// Category tree.
#[instrument(skip(auth))]
async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<CategoriesQuery>,
) -> Result<CategoriesTemplate> {
    let search = query.search.unwrap_or_default();
    let term = Some(search.trim()).filter(|s| !s.is_empty());
    let categories = auth
        .call(|t| backend::categories::list(auth.api(), t, term))
        .await?
        .into_items();

    // Subcategories are nested, drop top-level duplicates of them.
    let roots: Vec<Category> = categories
        .iter()
        .filter(|c| c.parent.is_none() || term.is_some())
        .cloned()
        .collect();

    Ok(CategoriesTemplate {
        ctx: PageContext::new(&auth, "/categories").await,
        rows: Category::flatten(&roots)
            .into_iter()
            .map(|(depth, c)| CategoryRow::new(depth, c))
            .collect(),
        parents: category_options(&roots),
        search,
    })
}

/// Create a category, or a subcategory when `parent` is set.
#[instrument(skip(auth, form))]
async fn create(
    RequireAdminAuth(auth): RequireAdminAuth,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let input = form.input();
    let back = input
        .parent
        .map_or_else(|| "/categories".to_string(), |p| format!("/categories/{p}"));

    if input.name.is_empty() {
        auth.flash(Flash::error("Please enter a category name")).await;
        return Ok(Redirect::to(&back));
    }

    let result = auth
        .call(|t| backend::categories::create(auth.api(), t, &input))
        .await;
    report(
        &auth,
        result,
        "Category created successfully",
        "Error creating category",
    )
    .await?;
    Ok(Redirect::to(&back))
}

/// Category detail with its subcategories.
#[instrument(skip(auth))]
async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<CategoryId>,
) -> Result<CategoryTemplate> {
    let category = auth
        .call(|t| backend::categories::get(auth.api(), t, id))
        .await?;

    Ok(CategoryTemplate {
        ctx: PageContext::new(&auth, "/categories").await,
        subcategories: category
            .subcategories
            .iter()
            .map(|c| CategoryRow::new(1, c))
            .collect(),
        category: CategoryRow::new(0, &category),
    })
}

#[instrument(skip(auth, form))]
async fn update(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let back = format!("/categories/{id}");
    let current = auth
        .call(|t| backend::categories::get(auth.api(), t, id))
        .await?;

    let mut input = form.input();
    input.parent = current.parent;
    match check_edit(&current, &input) {
        EditCheck::Unchanged => {
            auth.flash(Flash::error("Category has not changed")).await;
        }
        EditCheck::MissingName => {
            auth.flash(Flash::error("Please enter a category name")).await;
        }
        EditCheck::Ok => {
            let result = auth
                .call(|t| backend::categories::update(auth.api(), t, id, &input))
                .await;
            report(
                &auth,
                result,
                "Category updated successfully",
                "Error updating category",
            )
            .await?;
        }
    }
    Ok(Redirect::to(&back))
}

/// Delete a category. Subcategories return to their parent's page.
#[instrument(skip(auth, form))]
async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<CategoryId>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::categories::delete(auth.api(), t, id))
        .await;
    let deleted = report(
        &auth,
        result,
        "Category deleted successfully",
        "Error deleting category",
    )
    .await?;

    let parent: Option<CategoryId> = parse_opt(form.parent.as_deref());
    let back = match (deleted, parent) {
        (_, Some(parent)) => format!("/categories/{parent}"),
        (Some(()), None) => "/categories".to_string(),
        (None, None) => format!("/categories/{id}"),
    };
    Ok(Redirect::to(&back))
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub parent: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stored() -> Category {
        serde_json::from_str(
            r#"{"id": 3, "name": "Shirts", "description": "Cotton shirts", "subcategories": [
                {"id": 5, "name": "Polo", "parent": 3}
            ]}"#,
        )
        .unwrap()
    }

    fn input(name: &str, description: &str) -> CategoryInput {
        CategoryInput {
            name: name.into(),
            description: description.into(),
            parent: None,
        }
    }

    #[test]
    fn test_unchanged_edit_is_reported() {
        assert_eq!(
            check_edit(&stored(), &input("Shirts", "Cotton shirts")),
            EditCheck::Unchanged
        );
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert_eq!(
            check_edit(&stored(), &input("", "Cotton shirts")),
            EditCheck::MissingName
        );
        assert_eq!(check_edit(&stored(), &input("Tops", "")), EditCheck::Ok);
    }

    #[test]
    fn test_category_options_indent_children() {
        let options = category_options(&[stored()]);
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Shirts", "— Polo"]);
    }

    #[test]
    fn test_form_trims_and_parses_parent() {
        let form = CategoryForm {
            name: "  Dresses ".into(),
            description: String::new(),
            parent: Some("3".into()),
        };
        let input = form.input();
        assert_eq!(input.name, "Dresses");
        assert_eq!(input.parent, Some(CategoryId::new(3)));
    }
}
