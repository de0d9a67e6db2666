//! Customer sign-in, registration and password recovery.
//!
//! Credentials go straight to the commerce API; on success the token pair
//! and a minimal identity are stored in the session. Every POST here shares
//! one per-IP rate limit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use boutique_core::client::{LoginError, SessionTokens};
use boutique_core::{PasswordReset, Registration};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::safe_next;
use crate::components::PageContext;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, auth_rate_limiter, clear_login, store_login};
use crate::models::{CurrentCustomer, Flash, StoredLogin, session_keys};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub error: Option<String>,
}

/// Second signup step: the OTP emailed at registration.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub notice: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/recover.html")]
pub struct RecoverTemplate {
    pub ctx: PageContext,
    /// 1 = email, 2 = OTP, 3 = new password.
    pub step: u8,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub repeat_password: String,
}

impl SignupForm {
    /// Registration body, or the message for the first problem.
    ///
    /// # Errors
    ///
    /// Returns a message for a missing field or mismatched passwords.
    pub fn registration(&self) -> std::result::Result<Registration, &'static str> {
        let checks = [
            (self.name.trim().is_empty(), "Name is required"),
            (self.email.trim().is_empty(), "Email is required"),
            (self.phone_number.trim().is_empty(), "Phone number is required"),
            (self.password.is_empty(), "Password is required"),
            (self.repeat_password.is_empty(), "Repeat password is required"),
            (self.password != self.repeat_password, "Passwords do not match"),
        ];
        if let Some((_, message)) = checks.into_iter().find(|(failed, _)| *failed) {
            return Err(message);
        }
        Ok(Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub email: String,
    pub otp: String,
}

/// One posted step of the reset flow.
#[derive(Debug, Default, Deserialize)]
pub struct RecoverForm {
    #[serde(default)]
    pub step: u8,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

pub fn router() -> Router<AppState> {
    let limiter = auth_rate_limiter();
    Router::new()
        .route(
            "/login",
            get(login_page).merge(post(login).layer(limiter.clone())),
        )
        .route("/logout", post(logout))
        .route(
            "/signup",
            get(signup_page).merge(post(signup).layer(limiter.clone())),
        )
        .route("/signup/verify", post(verify).layer(limiter.clone()))
        .route(
            "/account/recover-password",
            get(recover_page).merge(post(recover).layer(limiter)),
        )
}

// =============================================================================
// Login
// =============================================================================

async fn login_page(
    OptionalAuth(auth): OptionalAuth,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if auth.is_some() {
        return Redirect::to(&next).into_response();
    }
    LoginTemplate {
        ctx: PageContext::new(&session, None, "/login").await,
        email: String::new(),
        next,
        error: None,
    }
    .into_response()
}

#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let next = safe_next(form.next.as_deref()).to_string();
    let failure = |session: Session, email: String, next: String, message: String| async move {
        LoginTemplate {
            ctx: PageContext::new(&session, None, "/login").await,
            email,
            next,
            error: Some(message),
        }
        .into_response()
    };

    if email.is_empty() {
        let message = "Email field cannot be empty. Please fill it in.".to_string();
        return Ok(failure(session, email, next, message).await);
    }
    if form.password.is_empty() {
        let message = "Password field cannot be empty. Please fill it in.".to_string();
        return Ok(failure(session, email, next, message).await);
    }

    let pair = match state.api().login(&email, &form.password).await {
        Ok(pair) => pair,
        Err(err @ (LoginError::UnknownAccount | LoginError::WrongPassword)) => {
            info!(error = %err, "login rejected");
            return Ok(failure(session, email, next, err.to_string()).await);
        }
        Err(LoginError::Forbidden) => {
            let message = LoginError::Forbidden.to_string();
            return Ok(failure(session, email, next, message).await);
        }
        Err(LoginError::Other(err)) => {
            warn!(error = %err, "login failed");
            return Ok(failure(session, email, next, err.user_message()).await);
        }
    };

    let customer = CurrentCustomer::from_login(&email, &pair);
    set_sentry_user(&customer.email);
    store_login(
        &session,
        StoredLogin {
            customer,
            tokens: SessionTokens::from(&pair),
        },
    )
    .await?;
    Flash::success("Login successfully!").queue(&session).await;

    info!("customer signed in");
    Ok(Redirect::to(&next).into_response())
}

#[instrument(skip_all)]
async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
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
    Flash::success("Logout successfully!").queue(&session).await;

    Redirect::to("/")
}

// =============================================================================
// Registration
// =============================================================================

async fn signup_page(session: Session) -> SignupTemplate {
    SignupTemplate {
        ctx: PageContext::new(&session, None, "/signup").await,
        name: String::new(),
        email: String::new(),
        phone_number: String::new(),
        error: None,
    }
}

#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let rejected = |session: Session, form: SignupForm, message: String| async move {
        SignupTemplate {
            ctx: PageContext::new(&session, None, "/signup").await,
            name: form.name,
            email: form.email,
            phone_number: form.phone_number,
            error: Some(message),
        }
        .into_response()
    };

    let registration = match form.registration() {
        Ok(registration) => registration,
        Err(message) => return Ok(rejected(session, form, message.to_string()).await),
    };

    if let Err(err) = state.api().register(&registration).await {
        warn!(error = %err, "registration failed");
        let message = super::failure_message("Error while registering", &err);
        return Ok(rejected(session, form, message).await);
    }

    info!("account registered, awaiting email verification");
    Ok(VerifyTemplate {
        ctx: PageContext::new(&session, None, "/signup").await,
        email: registration.email,
        notice: "Please check your email and enter the 6-digit OTP code below".to_string(),
        error: None,
    }
    .into_response())
}

#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn verify(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyForm>,
) -> Response {
    let email = form.email.trim().to_string();
    match state.api().verify_email(&email, form.otp.trim()).await {
        Ok(_) => {
            Flash::success("Register successfully").queue(&session).await;
            Redirect::to("/login").into_response()
        }
        Err(err) => {
            info!(error = %err, "email verification rejected");
            VerifyTemplate {
                ctx: PageContext::new(&session, None, "/signup").await,
                email,
                notice: "Please check your email and enter the 6-digit OTP code below"
                    .to_string(),
                error: Some("OTP is incorrect. Please try again.".to_string()),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Password recovery
// =============================================================================

/// Check a step-3 submission against the email confirmed in step 2.
///
/// # Errors
///
/// Returns the message to show when the step cannot proceed.
pub fn check_new_password(
    confirmed: Option<&str>,
    form: &RecoverForm,
) -> std::result::Result<PasswordReset, &'static str> {
    let Some(email) = confirmed.filter(|e| e.eq_ignore_ascii_case(form.email.trim())) else {
        return Err("Please verify the code sent to your email first.");
    };
    if form.new_password.is_empty() {
        return Err("Password is required");
    }
    if form.new_password != form.confirm_password {
        return Err("Passwords do not match");
    }
    Ok(PasswordReset::SetPassword {
        email: email.to_string(),
        new_password: form.new_password.clone(),
    })
}

async fn recover_page(session: Session) -> RecoverTemplate {
    RecoverTemplate {
        ctx: PageContext::new(&session, None, "/account/recover-password").await,
        step: 1,
        email: String::new(),
        error: None,
    }
}

#[instrument(skip(state, session, form), fields(step = form.step))]
async fn recover(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RecoverForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let render = |session: Session, step: u8, email: String, error: Option<String>| async move {
        RecoverTemplate {
            ctx: PageContext::new(&session, None, "/account/recover-password").await,
            step,
            email,
            error,
        }
        .into_response()
    };

    match form.step {
        2 => {
            let step = PasswordReset::VerifyOtp {
                email: email.clone(),
                otp: form.otp.trim().to_string(),
            };
            match state.api().reset_password(&step).await {
                Ok(_) => {
                    session.insert(session_keys::RESET_EMAIL, &email).await?;
                    Ok(render(session, 3, email, None).await)
                }
                Err(err) => {
                    info!(error = %err, "reset OTP rejected");
                    let message = "OTP is incorrect. Please try again.".to_string();
                    Ok(render(session, 2, email, Some(message)).await)
                }
            }
        }
        3 => {
            let confirmed: Option<String> = session.get(session_keys::RESET_EMAIL).await?;
            let step = match check_new_password(confirmed.as_deref(), &form) {
                Ok(step) => step,
                Err(message) => {
                    let back = if confirmed.is_some() { 3 } else { 1 };
                    return Ok(render(session, back, email, Some(message.to_string())).await);
                }
            };
            if let Err(err) = state.api().reset_password(&step).await {
                warn!(error = %err, "password reset failed");
                let message = super::failure_message("Failed to change password.", &err);
                return Ok(render(session, 3, email, Some(message)).await);
            }
            session.remove::<String>(session_keys::RESET_EMAIL).await?;
            Flash::success("Password changed successfully. Please log in again.")
                .queue(&session)
                .await;
            Ok(Redirect::to("/login").into_response())
        }
        _ => {
            if email.is_empty() {
                let message = "Please enter a valid email".to_string();
                return Ok(render(session, 1, email, Some(message)).await);
            }
            let step = PasswordReset::RequestOtp {
                email: email.clone(),
            };
            match state.api().reset_password(&step).await {
                Ok(_) => Ok(render(session, 2, email, None).await),
                Err(err) => {
                    warn!(error = %err, "reset email failed");
                    let message = super::failure_message("Error while sending email", &err);
                    Ok(render(session, 1, email, Some(message)).await)
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            name: "Mai Anh".into(),
            email: " mai@gmail.com ".into(),
            phone_number: "0901234567".into(),
            password: "s3cret!".into(),
            repeat_password: "s3cret!".into(),
        }
    }

    #[test]
    fn test_signup_builds_registration() {
        let registration = signup().registration().unwrap();
        assert_eq!(registration.email, "mai@gmail.com");
        assert_eq!(registration.phone_number, "0901234567");
    }

    #[test]
    fn test_signup_rejects_mismatched_passwords() {
        let form = SignupForm {
            repeat_password: "other".into(),
            ..signup()
        };
        assert_eq!(form.registration().unwrap_err(), "Passwords do not match");
        assert_eq!(
            SignupForm::default().registration().unwrap_err(),
            "Name is required"
        );
    }

    #[test]
    fn test_new_password_needs_confirmed_email() {
        let form = RecoverForm {
            step: 3,
            email: "mai@gmail.com".into(),
            new_password: "n3w".into(),
            confirm_password: "n3w".into(),
            ..RecoverForm::default()
        };
        assert!(check_new_password(None, &form).is_err());
        assert!(check_new_password(Some("someone@else.vn"), &form).is_err());

        let step = check_new_password(Some("MAI@gmail.com"), &form).unwrap();
        assert_eq!(step.step(), 3);
    }

    #[test]
    fn test_new_password_must_match() {
        let form = RecoverForm {
            step: 3,
            email: "mai@gmail.com".into(),
            new_password: "n3w".into(),
            confirm_password: "typo".into(),
            ..RecoverForm::default()
        };
        assert_eq!(
            check_new_password(Some("mai@gmail.com"), &form).unwrap_err(),
            "Passwords do not match"
        );
    }
}
