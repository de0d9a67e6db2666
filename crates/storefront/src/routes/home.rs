//! Home page: new arrivals and best sellers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend;
use crate::components::{PageContext, ProductCard};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Products per home shelf.
const SHELF_SIZE: u32 = 8;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub new_arrivals: Vec<ProductCard>,
    pub best_sellers: Vec<ProductCard>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

#[instrument(skip_all)]
async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<HomeTemplate> {
    let api = state.api();
    let (latest, best) = tokio::try_join!(
        backend::catalog::latest(api, SHELF_SIZE),
        backend::catalog::best_sellers(api, SHELF_SIZE),
    )?;

    Ok(HomeTemplate {
        ctx: PageContext::new(&session, auth.as_ref().map(|a| &a.customer), "/").await,
        new_arrivals: ProductCard::many(latest.items()),
        best_sellers: ProductCard::many(best.items()),
    })
}
