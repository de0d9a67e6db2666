//! Commerce API reachability check.

use boutique_core::client::ApiClient;
use tracing::info;

use super::CliError;

/// Ping the commerce API and report the round trip.
///
/// # Errors
///
/// Returns an error if the API does not answer.
pub async fn run(api: &ApiClient) -> Result<(), CliError> {
    let elapsed = api.ping().await?;
    info!(
        url = %api.base_url(),
        latency_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "commerce API is reachable"
    );
    Ok(())
}
