//! Authentication route handlers.
//!
//! Handles password login, registration and Google sign-in against the
//! backend API. The backend token is kept in the server-side session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tower_sessions::cookie::Cookie;
use tracing::instrument;
use zaheen_core::Email;

use crate::backend::{AuthSession, RegisterRequest};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Minimum password length accepted on login.
const MIN_LOGIN_PASSWORD: usize = 6;

/// Minimum password length accepted on registration.
const MIN_REGISTER_PASSWORD: usize = 8;

/// Cookie set by Google Identity Services alongside the posted credential.
const GOOGLE_CSRF_COOKIE: &str = "g_csrf_token";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Credential posted by Google Identity Services in redirect mode.
#[derive(Deserialize)]
pub struct GoogleCredentialForm {
    pub credential: String,
    pub g_csrf_token: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Text for an error code passed back to the login or register page.
fn error_message(code: &str) -> &'static str {
    match code {
        "email" => "Invalid email address",
        "password" => "Password must be at least 6 characters",
        "password_length" => "Password must be at least 8 characters",
        "mismatch" => "Passwords don't match",
        "name" => "Please enter your name",
        "credentials" => "Login failed. Please check your email and password.",
        "google" => "Google login failed",
        "register" => "Signup failed. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

fn success_message(code: &str) -> &'static str {
    match code {
        "registered" => "Signup successful! You can now log in.",
        _ => "Done.",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    pub google_client_id: Option<String>,
    pub google_login_uri: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

// =============================================================================
// Validation
// =============================================================================

/// Validate the registration form, returning the backend request or the
/// error code for the first failing field.
fn validate_registration(form: RegisterForm) -> Result<RegisterRequest, &'static str> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("name");
    }
    let email = Email::parse(&form.email).map_err(|_| "email")?;
    if form.password.chars().count() < MIN_REGISTER_PASSWORD {
        return Err("password_length");
    }
    if form.password != form.confirm_password {
        return Err("mismatch");
    }

    Ok(RegisterRequest {
        name: name.to_string(),
        email: email.as_str().to_string(),
        password: form.password,
        confirm_password: form.confirm_password,
    })
}

/// Value of the Google CSRF cookie, if the browser sent one.
fn google_csrf_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|c| c.name() == GOOGLE_CSRF_COOKIE)
        .map(|c| c.value().to_string())
}

/// Store the authenticated user in the session and send them on.
///
/// Admins land on the dashboard; everyone else goes back to the shop.
async fn complete_login(session: &Session, auth: AuthSession) -> Response {
    let user = match CurrentUser::from_auth(auth) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Backend returned user with invalid email");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
    };

    if let Err(e) = set_current_user(session, &user).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    let destination = if user.is_admin() { "/dashboard" } else { "/" };
    Redirect::to(destination).into_response()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        user,
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
        google_client_id: state.config().google_client_id.clone(),
        google_login_uri: format!("{}/auth/google", state.config().base_url.trim_end_matches('/')),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/auth/login?error=email").into_response();
    };
    if form.password.chars().count() < MIN_LOGIN_PASSWORD {
        return Redirect::to("/auth/login?error=password").into_response();
    }

    match state.backend().login(email.as_str(), &form.password).await {
        Ok(auth) => complete_login(&session, auth).await,
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

/// Handle a Google Identity Services credential.
///
/// The posted `g_csrf_token` must equal the cookie of the same name
/// (double-submit check) before the ID token is sent to the backend.
#[instrument(skip(state, session, headers, form))]
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<GoogleCredentialForm>,
) -> Response {
    if state.config().google_client_id.is_none() {
        return Redirect::to("/auth/login?error=google").into_response();
    }

    let cookie = google_csrf_cookie(&headers);
    if form.g_csrf_token.is_empty() || cookie.as_deref() != Some(form.g_csrf_token.as_str()) {
        tracing::warn!("Google sign-in rejected: CSRF token mismatch");
        return Redirect::to("/auth/login?error=google").into_response();
    }

    match state.backend().google_login(&form.credential).await {
        Ok(auth) => complete_login(&session, auth).await,
        Err(e) => {
            tracing::warn!("Google login failed: {}", e);
            Redirect::to("/auth/login?error=google").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        user,
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let request = match validate_registration(form) {
        Ok(request) => request,
        Err(code) => return Redirect::to(&format!("/auth/register?error={code}")).into_response(),
    };

    match state.backend().register(&request).await {
        Ok(()) => Redirect::to("/auth/login?success=registered").into_response(),
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            Redirect::to("/auth/register?error=register").into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Only the user is removed from the session; the cart stays.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(crate::models::session_keys::CURRENT_USER)
        .await
    {
        state.backend().logout(user.token()).await;
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_registration_validation() {
        let ok = validate_registration(form(" Ayesha ", "ayesha@example.com", "longenough", "longenough")).unwrap();
        assert_eq!(ok.name, "Ayesha");

        assert_eq!(
            validate_registration(form("", "a@example.com", "longenough", "longenough")).unwrap_err(),
            "name"
        );
        assert_eq!(
            validate_registration(form("A", "nope", "longenough", "longenough")).unwrap_err(),
            "email"
        );
        assert_eq!(
            validate_registration(form("A", "a@example.com", "short", "short")).unwrap_err(),
            "password_length"
        );
        assert_eq!(
            validate_registration(form("A", "a@example.com", "longenough", "different")).unwrap_err(),
            "mismatch"
        );
    }

    #[test]
    fn test_google_csrf_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("zaheen_session=abc; g_csrf_token=xyz123"),
        );
        assert_eq!(google_csrf_cookie(&headers).as_deref(), Some("xyz123"));

        assert_eq!(google_csrf_cookie(&HeaderMap::new()), None);
    }

    #[test]
    fn test_error_codes_have_messages() {
        assert_eq!(error_message("mismatch"), "Passwords don't match");
        assert_eq!(success_message("registered"), "Signup successful! You can now log in.");
    }
}
