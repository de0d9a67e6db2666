//! Gateway return processing.

use std::collections::BTreeMap;

use boutique_core::PaymentResult;
use boutique_core::client::{AccessToken, ApiClient, ApiError};

/// Forward the gateway's return parameters to `POST /process-payment/`.
///
/// The backend verifies the signature in `vnp_SecureHash` and records the
/// payment; the parameters are passed through untouched.
pub async fn process(
    api: &ApiClient,
    token: AccessToken,
    params: &BTreeMap<String, String>,
) -> Result<PaymentResult, ApiError> {
    api.post("process-payment/", params, Some(&token)).await
}
