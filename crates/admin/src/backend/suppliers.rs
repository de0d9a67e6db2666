//! `/suppliers/`.

use boutique_core::client::{AccessToken, ApiClient, ApiError};
use boutique_core::{Listing, NewSupplier, Supplier};

pub async fn list(api: &ApiClient, token: AccessToken) -> Result<Listing<Supplier>, ApiError> {
    api.get("suppliers/", Some(&token)).await
}

pub async fn create(
    api: &ApiClient,
    token: AccessToken,
    supplier: &NewSupplier,
) -> Result<Supplier, ApiError> {
    api.post("suppliers/", supplier, Some(&token)).await
}
