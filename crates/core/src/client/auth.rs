//! Token handling and the `/auth/*` endpoints.
//!
//! The commerce API issues a short-lived access token and a refresh token at
//! login. The refresh endpoint reads the refresh token from a `refresh`
//! cookie rather than the body, so requests set that cookie explicitly.

use std::future::Future;

use reqwest::Method;
use reqwest::header::COOKIE;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::{ApiClient, ApiError, error_message, handle_response, parse_error};
use crate::resources::{
    Ack, LoginRequest, PasswordReset, RefreshedAccess, Registration, TokenPair, VerifyEmail,
};

/// Bearer token for authenticated calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Long-lived token exchanged for new access tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn cookie(&self) -> String {
        format!("refresh={}", self.0)
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken([REDACTED])")
    }
}

/// The token pair kept in a signed-in user's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: AccessToken,
    pub refresh: Option<RefreshToken>,
}

impl From<&TokenPair> for SessionTokens {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access: AccessToken::new(pair.access.clone()),
            refresh: Some(RefreshToken::new(pair.refresh.clone())),
        }
    }
}

/// Outcome of [`ApiClient::with_refresh`].
#[derive(Debug)]
pub struct Refreshed<T> {
    pub value: T,
    /// Set when the access token was renewed during the call.
    pub access: Option<AccessToken>,
}

/// Why a login attempt failed.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("User does not exist")]
    UnknownAccount,

    #[error("Incorrect password")]
    WrongPassword,

    /// The account exists but may not use this application.
    #[error("This account is not allowed to sign in here")]
    Forbidden,

    #[error(transparent)]
    Other(#[from] ApiError),
}

impl LoginError {
    /// Classify a failed login response by status and backend detail text.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = error_message(body);
        match status {
            401 | 403 | 404 if message.eq_ignore_ascii_case("User does not exist") => {
                Self::UnknownAccount
            }
            401 | 403 if message.eq_ignore_ascii_case("Incorrect password") => Self::WrongPassword,
            401 | 403 => Self::Other(ApiError::Unauthorized),
            404 => Self::Other(ApiError::NotFound(message)),
            _ => Self::Other(ApiError::Api { status, message }),
        }
    }
}

/// Value of the `access` cookie in a response's `Set-Cookie` headers.
fn access_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == "access" && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl ApiClient {
    /// Exchange credentials for a token pair.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::UnknownAccount`] or [`LoginError::WrongPassword`]
    /// for the backend's two credential failures, and [`LoginError::Other`]
    /// for anything else.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, LoginError> {
        let response = self
            .request(Method::POST, "auth/login/", None)?
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            let pair: TokenPair = handle_response(response).await?;
            info!("login succeeded");
            return Ok(pair);
        }

        let body = response.text().await.unwrap_or_default();
        let err = LoginError::from_response(status.as_u16(), &body);
        debug!(error = %err, "login rejected");
        Err(err)
    }

    /// Confirm that a fresh token pair belongs to a staff account.
    ///
    /// Uses the account when the login response carried one. The backend
    /// usually sends the bare pair, so otherwise this lists sales, which only
    /// admin users may read.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Forbidden`] for customer accounts and
    /// [`LoginError::Other`] when the check itself fails.
    #[instrument(skip_all)]
    pub async fn confirm_staff(&self, pair: &TokenPair) -> Result<(), LoginError> {
        if let Some(user) = &pair.user {
            return if user.is_staff() {
                Ok(())
            } else {
                Err(LoginError::Forbidden)
            };
        }

        let token = AccessToken::new(pair.access.clone());
        match self.get::<IgnoredAny>("promotions/", Some(&token)).await {
            Ok(_) => Ok(()),
            Err(ApiError::Unauthorized) => Err(LoginError::Forbidden),
            Err(err) => Err(LoginError::Other(err)),
        }
    }

    /// Obtain a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the refresh token is missing,
    /// expired or revoked.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh: &RefreshToken) -> Result<AccessToken, ApiError> {
        let response = self
            .request(Method::POST, "auth/refresh-token/", None)?
            .header(COOKIE, refresh.cookie())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        // The backend answers 400 for a missing cookie.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(ApiError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        // The new token arrives as an `access` cookie; some deployments also
        // put it in the body.
        if let Some(token) = access_cookie(response.headers()) {
            return Ok(AccessToken::new(token));
        }
        let refreshed: RefreshedAccess = handle_response(response).await?;
        refreshed
            .access
            .map(AccessToken::new)
            .ok_or_else(|| ApiError::Parse("refresh response carried no access token".to_string()))
    }

    /// Revoke the session's refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the logout.
    #[instrument(skip_all)]
    pub async fn logout(&self, tokens: &SessionTokens) -> Result<(), ApiError> {
        let mut request = self.request(Method::POST, "auth/logout/", Some(&tokens.access))?;
        if let Some(refresh) = &tokens.refresh {
            request = request.header(COOKIE, refresh.cookie());
        }
        let response = request.json(&serde_json::json!({})).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response).await)
    }

    /// Create an account; the backend emails a verification OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the data is invalid.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("auth/register/", registration, None).await?;
        Ok(())
    }

    /// Confirm an email address with the OTP sent at registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTP is wrong or expired.
    #[instrument(skip(self, otp))]
    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<Ack, ApiError> {
        self.post("auth/verify-email/", &VerifyEmail { email, otp }, None)
            .await
    }

    /// Run one step of the three-step password reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the step.
    #[instrument(skip(self, step), fields(step = step.step()))]
    pub async fn reset_password(&self, step: &PasswordReset) -> Result<Ack, ApiError> {
        let path = format!("auth/reset-password/?step={}", step.step());
        self.post(&path, step, None).await
    }

    /// Run an authenticated call, refreshing the access token once on `401`.
    ///
    /// The call is retried exactly once with the new token. When a refresh
    /// happened the new access token is returned so the caller can store it.
    ///
    /// # Errors
    ///
    /// Returns the call's error, or [`ApiError::Unauthorized`] when the token
    /// cannot be refreshed.
    pub async fn with_refresh<T, F, Fut>(
        &self,
        tokens: &SessionTokens,
        call: F,
    ) -> Result<Refreshed<T>, ApiError>
    where
        F: Fn(AccessToken) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match call(tokens.access.clone()).await {
            Err(ApiError::Unauthorized) => {
                let Some(refresh) = &tokens.refresh else {
                    return Err(ApiError::Unauthorized);
                };
                let access = self.refresh(refresh).await.inspect_err(|e| {
                    warn!(error = %e, "access token refresh failed");
                })?;
                debug!("access token refreshed, retrying call");
                let value = call(access.clone()).await?;
                Ok(Refreshed {
                    value,
                    access: Some(access),
                })
            }
            result => result.map(|value| Refreshed {
                value,
                access: None,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_mapping() {
        assert!(matches!(
            LoginError::from_response(404, r#"{"detail": "User does not exist"}"#),
            LoginError::UnknownAccount
        ));
        assert!(matches!(
            LoginError::from_response(401, r#"{"detail": "User does not exist"}"#),
            LoginError::UnknownAccount
        ));
        assert!(matches!(
            LoginError::from_response(401, r#"{"detail": "Incorrect password"}"#),
            LoginError::WrongPassword
        ));
        assert!(matches!(
            LoginError::from_response(401, r#"{"detail": "Token is blacklisted"}"#),
            LoginError::Other(ApiError::Unauthorized)
        ));
        assert!(matches!(
            LoginError::from_response(500, "oops"),
            LoginError::Other(ApiError::Api { status: 500, .. })
        ));
    }

    #[test]
    fn test_access_cookie_extraction() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(
            reqwest::header::SET_COOKIE,
            "csrftoken=abc; Path=/".parse().unwrap(),
        );
        headers.append(
            reqwest::header::SET_COOKIE,
            "access=new.jwt.token; Max-Age=300; Path=/; SameSite=Lax".parse().unwrap(),
        );
        assert_eq!(access_cookie(&headers).as_deref(), Some("new.jwt.token"));
        assert_eq!(access_cookie(&reqwest::header::HeaderMap::new()), None);
    }

    #[test]
    fn test_tokens_are_redacted() {
        let tokens = SessionTokens {
            access: AccessToken::new("secret-access".into()),
            refresh: Some(RefreshToken::new("secret-refresh".into())),
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret"));
        assert_eq!(tokens.refresh.as_ref().unwrap().cookie(), "refresh=secret-refresh");
    }

    #[test]
    fn test_tokens_round_trip_through_session_json() {
        let tokens = SessionTokens {
            access: AccessToken::new("a".into()),
            refresh: None,
        };
        let json = serde_json::to_string(&tokens).unwrap();
        assert_eq!(json, r#"{"access":"a","refresh":null}"#);
        let back: SessionTokens = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tokens);
    }
}
