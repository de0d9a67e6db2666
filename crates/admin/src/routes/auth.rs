//! Staff sign-in against the commerce API.
//!
//! The login form posts credentials to `POST /auth/login/`. Accounts whose
//! only role is `Customer` are turned away; the token pair and identity are
//! kept in the session for every later service call.
//!
//! The backend normally answers with the bare token pair, so staff access is
//! confirmed by calling a staff-only endpoint with the new access token
//! before anything is stored.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use boutique_core::client::{LoginError, SessionTokens};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_login, store_login};
use crate::models::{CurrentAdmin, StoredLogin};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    email: String,
    error: Option<String>,
}

/// Login form input.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// GET /auth/login
async fn login_page() -> impl IntoResponse {
    LoginPageTemplate {
        email: String::new(),
        error: None,
    }
}

fn login_failure(email: String, message: impl Into<String>) -> Response {
    LoginPageTemplate {
        email,
        error: Some(message.into()),
    }
    .into_response()
}

/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Ok(login_failure(email, "Please enter your email and password"));
    }

    let pair = match state.api().login(&email, &form.password).await {
        Ok(pair) => pair,
        Err(err @ (LoginError::UnknownAccount | LoginError::WrongPassword)) => {
            info!(error = %err, "login rejected");
            return Ok(login_failure(email, err.to_string()));
        }
        Err(LoginError::Forbidden) => {
            return Ok(login_failure(email, LoginError::Forbidden.to_string()));
        }
        Err(LoginError::Other(err)) => {
            warn!(error = %err, "login failed");
            return Ok(login_failure(email, err.user_message()));
        }
    };

    match state.api().confirm_staff(&pair).await {
        Ok(()) => {}
        Err(LoginError::Forbidden) => {
            warn!("customer account tried to sign in to the console");
            if let Err(e) = state.api().logout(&SessionTokens::from(&pair)).await {
                warn!(error = %e, "backend logout failed");
            }
            return Ok(login_failure(email, LoginError::Forbidden.to_string()));
        }
        Err(err) => {
            warn!(error = %err, "staff check failed");
            let message = match err {
                LoginError::Other(api_err) => api_err.user_message(),
                other => other.to_string(),
            };
            return Ok(login_failure(email, message));
        }
    }

    let admin = CurrentAdmin::from_login(&email, &pair);
    set_sentry_user(&admin.email);
    store_login(
        &session,
        StoredLogin {
            admin,
            tokens: SessionTokens::from(&pair),
        },
    )
    .await?;

    info!("staff signed in");
    Ok(Redirect::to("/").into_response())
}

/// POST /auth/logout
#[instrument(skip_all)]
async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    match clear_login(&session).await {
        Ok(Some(tokens)) => {
            if let Err(e) = state.api().logout(&tokens).await {
                warn!(error = %e, "backend logout failed");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "failed to clear session"),
    }
    clear_sentry_user();

    Redirect::to("/auth/login")
}
