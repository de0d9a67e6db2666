//! JSON lookups behind the address pickers.
//!
//! Ids in the responses are the commerce API's own, ready to post back in
//! an address form.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use boutique_core::Location;

use crate::backend;
use crate::error::Result;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/provinces", get(provinces))
        .route("/api/provinces/{id}/districts", get(districts))
        .route("/api/districts/{id}/wards", get(wards))
}

async fn provinces(State(state): State<AppState>) -> Result<Json<Vec<Location>>> {
    let list = backend::locations::provinces(&state).await?;
    Ok(Json(Arc::unwrap_or_clone(list)))
}

async fn districts(
    State(state): State<AppState>,
    Path(province): Path<i32>,
) -> Result<Json<Vec<Location>>> {
    let list = backend::locations::districts(&state, province).await?;
    Ok(Json(Arc::unwrap_or_clone(list)))
}

async fn wards(
    State(state): State<AppState>,
    Path(district): Path<i32>,
) -> Result<Json<Vec<Location>>> {
    let list = backend::locations::wards(&state, district).await?;
    Ok(Json(Arc::unwrap_or_clone(list)))
}
