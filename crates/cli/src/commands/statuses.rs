//! Order status listing.

use boutique_core::client::{AccessToken, ApiClient};
use boutique_core::{Listing, OrderStatus, OrderStatusRecord};
use tracing::{info, warn};

use super::CliError;
use super::login::{sign_in, sign_out};

/// List every status the backend knows, flagging codes this build does not.
///
/// # Errors
///
/// Returns an error if the login fails or the statuses cannot be fetched.
pub async fn run(api: &ApiClient, email: &str) -> Result<(), CliError> {
    // The status list is only served to signed-in accounts.
    let pair = sign_in(api, email).await?;
    let token = AccessToken::new(pair.access.clone());
    let statuses: Result<Listing<OrderStatusRecord>, _> =
        api.get("order-statuses/", Some(&token)).await;
    sign_out(api, &pair).await;
    let statuses = statuses?;

    for status in statuses.items() {
        if status.status().is_some() {
            info!(
                id = %status.id,
                code = %status.status_code,
                name = %status.display_name(),
                message = %status.message(),
            );
        } else {
            warn!(id = %status.id, code = %status.status_code, "unknown status code");
        }
    }

    let missing: Vec<&str> = OrderStatus::ALL
        .iter()
        .map(|s| s.code())
        .filter(|code| OrderStatusRecord::id_for_code(statuses.items(), code).is_none())
        .collect();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "statuses missing from the backend");
    }
    Ok(())
}
