//! Accounts.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// An account known to the commerce API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Single role as some endpoints report it.
    #[serde(default)]
    pub role: Option<Role>,
    /// Role list as other endpoints report it.
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<FixedOffset>>,
}

impl User {
    /// Name for display, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Every role the account holds, wherever the backend put it.
    #[must_use]
    pub fn all_roles(&self) -> Vec<Role> {
        let mut roles = self.roles.clone();
        if let Some(role) = self.role
            && !roles.contains(&role)
        {
            roles.push(role);
        }
        roles
    }

    /// Whether the account may use the back-office console.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.all_roles().into_iter().any(Role::is_staff)
    }
}

const fn default_active() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles_from_either_field() {
        let single: User =
            serde_json::from_str(r#"{"id": 1, "email": "a@b.vn", "role": "Moderator"}"#).unwrap();
        assert!(single.is_staff());

        let list: User = serde_json::from_str(
            r#"{"id": 2, "email": "c@d.vn", "roles": ["Customer"], "name": " "}"#,
        )
        .unwrap();
        assert!(!list.is_staff());
        assert_eq!(list.display_name(), "c@d.vn");
    }
}
