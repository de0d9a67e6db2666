//! Staff credential check.
//!
//! The password is read from `BOUTIQUE_ADMIN_PASSWORD` so it never lands in
//! shell history. The session opened by the check is closed again.

use boutique_core::TokenPair;
use boutique_core::client::{ApiClient, LoginError, SessionTokens};
use boutique_core::config as env;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use super::CliError;

const PASSWORD_VAR: &str = "BOUTIQUE_ADMIN_PASSWORD";

/// Roles of a login response, comma separated.
#[must_use]
pub fn describe_roles(pair: &TokenPair) -> String {
    pair.user.as_ref().map_or_else(
        || "unknown (login response carried no account)".to_string(),
        |user| {
            let roles = user.all_roles();
            if roles.is_empty() {
                "none".to_string()
            } else {
                roles
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        },
    )
}

/// Log in as `email` with the password from the environment.
///
/// # Errors
///
/// Returns an error if the password is unset or the login is refused.
pub async fn sign_in(api: &ApiClient, email: &str) -> Result<TokenPair, CliError> {
    let password = SecretString::from(env::required(PASSWORD_VAR)?);
    Ok(api.login(email.trim(), password.expose_secret()).await?)
}

/// Close a session opened by [`sign_in`]; failures are only logged.
pub async fn sign_out(api: &ApiClient, pair: &TokenPair) {
    if let Err(e) = api.logout(&SessionTokens::from(pair)).await {
        warn!(error = %e, "logout failed");
    }
}

/// Log in as `email`, print the roles, then log out.
///
/// # Errors
///
/// Returns an error if the password is unset, the login is refused, or the
/// account cannot read staff-only endpoints.
pub async fn run(api: &ApiClient, email: &str) -> Result<(), CliError> {
    let pair = sign_in(api, email).await?;

    let roles = describe_roles(&pair);
    info!(email = %email, roles = %roles, "credentials accepted");

    let staff = api.confirm_staff(&pair).await;
    sign_out(api, &pair).await;

    match staff {
        Ok(()) => Ok(()),
        Err(LoginError::Forbidden) => Err(CliError::Check(format!(
            "{email} is not a staff account and cannot use the console"
        ))),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_roles() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access": "a", "refresh": "r", "user": {"id": 1, "email": "a@b.vn",
                "roles": ["Admin"], "role": "Employee"}}"#,
        )
        .unwrap();
        assert_eq!(describe_roles(&pair), "Admin, Employee");

        let bare: TokenPair =
            serde_json::from_str(r#"{"access": "a", "refresh": "r"}"#).unwrap();
        assert!(describe_roles(&bare).starts_with("unknown"));
    }
}
