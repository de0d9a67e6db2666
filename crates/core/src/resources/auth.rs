//! Authentication request and response bodies.

use serde::{Deserialize, Serialize};

use super::users::User;

/// Body of `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login/`.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Some deployments include the account; used for role checks when present.
    #[serde(default)]
    pub user: Option<User>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `POST /auth/refresh-token/`. The token itself normally arrives as
/// a cookie.
#[derive(Clone, Deserialize)]
pub struct RefreshedAccess {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

/// Body of `POST /auth/verify-email/`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmail<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// One step of `POST /auth/reset-password/?step=N`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PasswordReset {
    /// Step 1: send an OTP to the address.
    RequestOtp { email: String },
    /// Step 2: check the OTP.
    VerifyOtp { email: String, otp: String },
    /// Step 3: set the new password.
    SetPassword { email: String, new_password: String },
}

impl PasswordReset {
    /// Value of the `step` query parameter.
    #[must_use]
    pub const fn step(&self) -> u8 {
        match self {
            Self::RequestOtp { .. } => 1,
            Self::VerifyOtp { .. } => 2,
            Self::SetPassword { .. } => 3,
        }
    }
}

/// Generic `{detail}`/`{message}` acknowledgement.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Ack {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.detail.as_deref().or(self.message.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_steps() {
        let step = PasswordReset::VerifyOtp {
            email: "a@b.vn".into(),
            otp: "123456".into(),
        };
        assert_eq!(step.step(), 2);
        assert_eq!(
            serde_json::to_value(&step).unwrap(),
            serde_json::json!({"email": "a@b.vn", "otp": "123456"})
        );
    }

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access": "aaa.bbb.ccc", "refresh": "ddd.eee.fff"}"#).unwrap();
        let debug = format!("{pair:?}");
        assert!(!debug.contains("aaa.bbb"));
        assert!(debug.contains("[REDACTED]"));
    }
}
