//! Authentication extractor for admin.
//!
//! A signed-in staff member is represented by a [`StoredLogin`] in the
//! session: the identity shown in the header plus the commerce API tokens
//! every service call needs.

use std::future::Future;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use boutique_core::client::{AccessToken, ApiClient, ApiError, Refreshed, SessionTokens};
use tokio::sync::RwLock;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{CurrentAdmin, Flash, StoredLogin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in staff member.
///
/// Redirects HTML requests to the login page and answers 401 on `/api/`.
///
/// ```rust,ignore
/// async fn handler(RequireAdminAuth(auth): RequireAdminAuth) -> Result<Html<String>> {
///     let orders = auth.call(|t| backend::orders::list(auth.api(), t, &filter)).await?;
///     // ...
/// }
/// ```
pub struct RequireAdminAuth(pub AdminSession);

/// Rejection when no staff member is signed in.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let is_api = parts.uri.path().starts_with("/api/");
        let reject = || {
            if is_api {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        };

        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(reject)?;
        let tokens: SessionTokens = session
            .get(session_keys::TOKENS)
            .await
            .ok()
            .flatten()
            .ok_or_else(reject)?;

        Ok(Self(AdminSession {
            admin,
            tokens: RwLock::new(tokens),
            session,
            api: state.api().clone(),
        }))
    }
}

/// The signed-in staff member's session, with helpers to call the commerce
/// API on their behalf.
pub struct AdminSession {
    pub admin: CurrentAdmin,
    tokens: RwLock<SessionTokens>,
    session: Session,
    api: ApiClient,
}

impl AdminSession {
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Run an authenticated call, refreshing the access token once on 401.
    ///
    /// A renewed token is written back to the session so later requests
    /// use it.
    ///
    /// # Errors
    ///
    /// Returns the call's error, or `ApiError::Unauthorized` when the
    /// refresh token is no longer accepted.
    pub async fn call<T, F, Fut>(&self, call: F) -> Result<T, AppError>
    where
        F: Fn(AccessToken) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let tokens = self.tokens.read().await.clone();
        let Refreshed { value, access } = self.api.with_refresh(&tokens, call).await?;

        if let Some(access) = access {
            let renewed = SessionTokens {
                access,
                refresh: tokens.refresh,
            };
            self.session.insert(session_keys::TOKENS, &renewed).await?;
            *self.tokens.write().await = renewed;
            debug!("stored refreshed access token");
        }
        Ok(value)
    }

    /// Queue a toast for the next page.
    pub async fn flash(&self, flash: Flash) {
        if let Err(e) = flash.store(&self.session).await {
            warn!(error = %e, "failed to store flash message");
        }
    }

    /// Take the pending toast.
    pub async fn take_flash(&self) -> Option<Flash> {
        Flash::take(&self.session).await
    }
}

/// Persist a successful login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_login(
    session: &Session,
    login: StoredLogin,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session id.
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_ADMIN, &login.admin)
        .await?;
    session.insert(session_keys::TOKENS, &login.tokens).await
}

/// Remove the login from the session and return the tokens it held.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_login(
    session: &Session,
) -> Result<Option<SessionTokens>, tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    session.remove::<SessionTokens>(session_keys::TOKENS).await
}
