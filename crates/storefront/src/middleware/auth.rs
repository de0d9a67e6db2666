//! Authentication extractors for the storefront.
//!
//! A signed-in customer is a [`StoredLogin`] in the session. Browsing the
//! catalog needs no login; cart, checkout and account pages do.

use std::future::Future;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use boutique_core::client::{AccessToken, ApiClient, ApiError, Refreshed, SessionTokens};
use tokio::sync::RwLock;
use tower_sessions::Session;
use tracing::debug;

use crate::error::AppError;
use crate::models::{CurrentCustomer, Flash, StoredLogin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// HTML requests are sent to `/login?next=<path>`; `/api/` requests get 401.
pub struct RequireAuth(pub CustomerSession);

/// Extractor for pages that adapt to an optional login (header, catalog).
pub struct OptionalAuth(pub Option<CustomerSession>);

/// Rejection when no customer is signed in.
pub enum AuthRejection {
    /// Redirect to login, carrying the page to return to.
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => {
                let target = format!("/login?next={}", urlencoding::encode(&next));
                Redirect::to(&target).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the stored login, if any.
async fn load(parts: &Parts, state: &AppState) -> Option<CustomerSession> {
    let session = parts.extensions.get::<Session>().cloned()?;
    let customer: CurrentCustomer = session
        .get(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()?;
    let tokens: SessionTokens = session.get(session_keys::TOKENS).await.ok().flatten()?;

    Some(CustomerSession {
        customer,
        tokens: RwLock::new(tokens),
        session,
        api: state.api().clone(),
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = load(parts, state).await {
            return Ok(Self(auth));
        }

        if parts.uri.path().starts_with("/api/") {
            Err(AuthRejection::Unauthorized)
        } else {
            let next = parts
                .uri
                .path_and_query()
                .map_or_else(|| "/".to_string(), ToString::to_string);
            Err(AuthRejection::RedirectToLogin(next))
        }
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(load(parts, state).await))
    }
}

/// The signed-in customer's session, with helpers to call the commerce API
/// on their behalf.
pub struct CustomerSession {
    pub customer: CurrentCustomer,
    tokens: RwLock<SessionTokens>,
    session: Session,
    api: ApiClient,
}

impl CustomerSession {
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
        flash.queue(&self.session).await;
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
        .insert(session_keys::CURRENT_CUSTOMER, &login.customer)
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
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    session.remove::<SessionTokens>(session_keys::TOKENS).await
}
