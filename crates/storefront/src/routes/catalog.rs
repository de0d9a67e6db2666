//! Catalog search and the category tree.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use boutique_core::{CatalogSort, Category, CategoryId, ProductFilter};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::parse_opt;
use crate::backend;
use crate::components::{PageContext, ProductCard};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Products per search page.
const PAGE_SIZE: u32 = 12;

/// `<option>` for the sort and category menus.
#[derive(Debug, Clone)]
pub struct MenuOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Category tree row with its nesting depth.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub image_url: String,
}

impl CategoryRow {
    /// Non-breaking indent for the `<select>` label.
    #[must_use]
    pub fn indent(&self) -> String {
        "\u{a0}\u{a0}".repeat(self.depth)
    }
}

fn category_rows(tree: &[Category]) -> Vec<CategoryRow> {
    Category::flatten(tree)
        .into_iter()
        .map(|(depth, c)| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            depth,
            image_url: c.image_url.clone().unwrap_or_default(),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub query: String,
    pub category: String,
    pub category_name: String,
    pub sorts: Vec<MenuOption>,
    pub categories: Vec<CategoryRow>,
    pub products: Vec<ProductCard>,
    pub total: u64,
    pub page: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/collections.html")]
pub struct CollectionsTemplate {
    pub ctx: PageContext,
    pub categories: Vec<CategoryRow>,
}

/// `?q=&cate=&sort=&page=`
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub cate: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl SearchQuery {
    /// Translate the storefront query into `GET /products/` filters.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.q.clone(),
            category: parse_opt(self.cate.as_deref()),
            sort: Some(CatalogSort::from_key(self.sort.as_deref())),
            latest: false,
            limit: Some(PAGE_SIZE),
            page: Some(self.page_number()),
        }
    }

    #[must_use]
    pub fn page_number(&self) -> u32 {
        parse_opt(self.page.as_deref()).filter(|p| *p > 0).unwrap_or(1)
    }

    /// Same search on another page.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        let mut url = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in [("q", &self.q), ("cate", &self.cate), ("sort", &self.sort)] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                url.append_pair(key, value);
            }
        }
        url.append_pair("page", &page.to_string());
        format!("/catalogsearch?{}", url.finish())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalogsearch", get(search))
        .route("/collections", get(collections))
}

#[instrument(skip(state, session, auth))]
async fn search(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let filter = query.filter();
    let api = state.api();
    let (products, tree) = tokio::try_join!(
        backend::catalog::search(api, &filter),
        backend::catalog::categories(api),
    )?;

    let sort = filter.sort.unwrap_or_default();
    let sorts = CatalogSort::ALL
        .iter()
        .map(|s| MenuOption {
            value: s.key().to_string(),
            label: s.label().to_string(),
            selected: *s == sort,
        })
        .collect();
    let category_name = filter
        .category
        .and_then(|id: CategoryId| Category::find(tree.items(), id))
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let page = query.page_number();
    Ok(SearchTemplate {
        ctx: PageContext::new(
            &session,
            auth.as_ref().map(|a| &a.customer),
            "/catalogsearch",
        )
        .await,
        query: query.q.clone().unwrap_or_default(),
        category: filter.category.map(|c| c.to_string()).unwrap_or_default(),
        category_name,
        sorts,
        categories: category_rows(tree.items()),
        total: products.total(),
        prev_url: (page > 1).then(|| query.page_url(page - 1)),
        next_url: products.has_next().then(|| query.page_url(page + 1)),
        products: ProductCard::many(products.items()),
        page,
    })
}

#[instrument(skip_all)]
async fn collections(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<CollectionsTemplate> {
    let tree = backend::catalog::categories(state.api()).await?;
    Ok(CollectionsTemplate {
        ctx: PageContext::new(&session, auth.as_ref().map(|a| &a.customer), "/collections").await,
        categories: category_rows(tree.items()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_maps_to_filter() {
        let query = SearchQuery {
            q: Some("ao thun".into()),
            cate: Some("4".into()),
            sort: Some("price_desc".into()),
            page: Some("2".into()),
        };
        let filter = query.filter();
        assert_eq!(filter.category, Some(CategoryId::new(4)));
        assert_eq!(filter.sort, Some(CatalogSort::PriceDesc));
        assert_eq!(filter.page, Some(2));
        assert_eq!(query.page_url(3), "/catalogsearch?q=ao+thun&cate=4&sort=price_desc&page=3");
    }

    #[test]
    fn test_unknown_sort_and_page_fall_back() {
        let query = SearchQuery {
            sort: Some("cheapest".into()),
            page: Some("0".into()),
            ..SearchQuery::default()
        };
        assert_eq!(query.filter().sort, Some(CatalogSort::NameAsc));
        assert_eq!(query.page_number(), 1);
    }
}
