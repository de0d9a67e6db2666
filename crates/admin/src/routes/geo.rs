//! JSON lookups backing the cascading province/district/ward selects.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use boutique_core::Division;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

type Divisions = Json<Vec<Division>>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/geo/provinces", get(provinces))
        .route("/api/geo/provinces/{code}/districts", get(districts))
        .route("/api/geo/districts/{code}/wards", get(wards))
}

#[instrument(skip(_auth, state))]
async fn provinces(
    RequireAdminAuth(_auth): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Divisions> {
    Ok(Json(Arc::unwrap_or_clone(state.geo().provinces().await?)))
}

#[instrument(skip(_auth, state))]
async fn districts(
    RequireAdminAuth(_auth): RequireAdminAuth,
    State(state): State<AppState>,
    Path(code): Path<i32>,
) -> Result<Divisions> {
    Ok(Json(Arc::unwrap_or_clone(state.geo().districts(code).await?)))
}

#[instrument(skip(_auth, state))]
async fn wards(
    RequireAdminAuth(_auth): RequireAdminAuth,
    State(state): State<AppState>,
    Path(code): Path<i32>,
) -> Result<Divisions> {
    Ok(Json(Arc::unwrap_or_clone(state.geo().wards(code).await?)))
}
