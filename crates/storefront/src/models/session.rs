//! Session-related types.
//!
//! Types stored in the session for authentication state and toasts.

use boutique_core::client::SessionTokens;
use boutique_core::{TokenPair, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

/// Session-stored customer identity.
///
/// Minimal data kept to greet the customer; everything else is fetched from
/// the commerce API on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Account id when the login response carried the user record.
    pub id: Option<UserId>,
    pub email: String,
    pub name: String,
}

impl CurrentCustomer {
    /// Build the identity from a login response, falling back to the email
    /// the form was submitted with.
    #[must_use]
    pub fn from_login(email: &str, pair: &TokenPair) -> Self {
        match &pair.user {
            Some(user) => Self {
                id: Some(user.id),
                email: user.email.clone(),
                name: user.display_name().to_string(),
            },
            None => Self {
                id: None,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
            },
        }
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, FlashLevel::Error)
    }

    /// Queue the flash for the next page. A failed write only loses the toast.
    pub async fn queue(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, self).await {
            warn!(error = %e, "failed to store flash message");
        }
    }

    /// Remove and return the pending flash, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

/// Session keys for storefront state.
pub mod keys {
    /// Signed-in customer identity.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Commerce API tokens.
    pub const TOKENS: &str = "api_tokens";

    /// Pending toast.
    pub const FLASH: &str = "flash";

    /// Email whose reset OTP has been confirmed.
    pub const RESET_EMAIL: &str = "reset_email";
}

/// Tokens and identity saved together at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLogin {
    pub customer: CurrentCustomer,
    pub tokens: SessionTokens,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_customer_from_bare_token_pair() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access": "a", "refresh": "r"}"#).unwrap();
        let customer = CurrentCustomer::from_login("mai@gmail.com", &pair);
        assert_eq!(customer.name, "mai");
        assert_eq!(customer.email, "mai@gmail.com");
        assert!(customer.id.is_none());
    }

    #[test]
    fn test_current_customer_uses_account_name() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access": "a", "refresh": "r", "user": {"id": 12, "name": "Mai Anh",
                "email": "mai@gmail.com", "roles": ["Customer"]}}"#,
        )
        .unwrap();
        let customer = CurrentCustomer::from_login("typed@x.vn", &pair);
        assert_eq!(customer.id, Some(UserId::new(12)));
        assert_eq!(customer.name, "Mai Anh");
    }

    #[test]
    fn test_flash_levels() {
        assert!(Flash::error("Out of stock").is_error());
        assert!(!Flash::success("Order created successfully!").is_error());
        let json = serde_json::to_value(Flash::success("ok")).unwrap();
        assert_eq!(json["level"], "success");
    }
}
