//! Session-stored state for the admin console.

use boutique_core::client::SessionTokens;
use boutique_core::{Role, TokenPair, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session-stored staff identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Account id when the login response carried the user record.
    pub id: Option<UserId>,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
}

impl CurrentAdmin {
    /// Build the identity from a login response, falling back to the email
    /// the form was submitted with.
    #[must_use]
    pub fn from_login(email: &str, pair: &TokenPair) -> Self {
        match &pair.user {
            Some(user) => Self {
                id: Some(user.id),
                email: user.email.clone(),
                name: user.display_name().to_string(),
                role: user.all_roles().into_iter().find(|r| r.is_staff()),
            },
            None => Self {
                id: None,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                role: None,
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

    /// Store the flash for the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn store(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::FLASH, self).await
    }

    /// Remove and return the pending flash, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

/// Session keys for admin state.
pub mod keys {
    /// Signed-in staff identity.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Commerce API tokens.
    pub const TOKENS: &str = "api_tokens";

    /// Pending toast.
    pub const FLASH: &str = "flash";
}

/// Tokens and identity saved together at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLogin {
    pub admin: CurrentAdmin,
    pub tokens: SessionTokens,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_admin_from_bare_token_pair() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access": "a", "refresh": "r"}"#).unwrap();
        let admin = CurrentAdmin::from_login("lan@boutique.vn", &pair);
        assert_eq!(admin.name, "lan");
        assert!(admin.role.is_none());
    }

    #[test]
    fn test_current_admin_picks_staff_role() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access": "a", "refresh": "r", "user": {"id": 4, "name": "Lan",
                "email": "lan@boutique.vn", "roles": ["Customer", "Moderator"]}}"#,
        )
        .unwrap();
        let admin = CurrentAdmin::from_login("ignored@x.vn", &pair);
        assert_eq!(admin.id, Some(UserId::new(4)));
        assert_eq!(admin.role, Some(Role::Moderator));
        assert_eq!(admin.email, "lan@boutique.vn");
    }

    #[test]
    fn test_flash_serializes_level() {
        let json = serde_json::to_value(Flash::error("Error creating product")).unwrap();
        assert_eq!(json["level"], "error");
    }
}
