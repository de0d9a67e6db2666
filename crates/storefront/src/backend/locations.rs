//! Provinces, districts and wards as imported into the commerce API.
//!
//! Address writes reference these by backend id. The lists rarely change, so
//! each response is cached in [`AppState::locations`] under its path.
//!
//! [`AppState::locations`]: crate::state::AppState::locations

use std::sync::Arc;

use boutique_core::client::ApiError;
use boutique_core::{Listing, Location};
use tracing::debug;

use crate::state::AppState;

async fn cached(state: &AppState, path: String) -> Result<Arc<Vec<Location>>, ApiError> {
    if let Some(hit) = state.locations().get(&path).await {
        return Ok(hit);
    }

    let listing: Listing<Location> = state.api().get(&path, None).await?;
    let locations = Arc::new(listing.into_items());
    debug!(path = %path, count = locations.len(), "cached locations");
    state.locations().insert(path, Arc::clone(&locations)).await;
    Ok(locations)
}

pub async fn provinces(state: &AppState) -> Result<Arc<Vec<Location>>, ApiError> {
    cached(state, "provinces/".to_string()).await
}

pub async fn districts(state: &AppState, province: i32) -> Result<Arc<Vec<Location>>, ApiError> {
    cached(state, format!("provinces/{province}/districts/")).await
}

pub async fn wards(state: &AppState, district: i32) -> Result<Arc<Vec<Location>>, ApiError> {
    cached(state, format!("districts/{district}/wards/")).await
}
