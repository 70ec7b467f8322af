//! Authentication endpoints.
//!
//! The backend issues an opaque bearer token on login. The storefront keeps
//! it server-side in the session and never exposes it to the browser.

use tracing::{instrument, warn};

use super::types::{
    AuthSession, Envelope, GoogleTokenRequest, LoginRequest, RegisterRequest, TokenResponse, User,
};
use super::{BackendClient, BackendError};

impl TokenResponse {
    fn into_session(self) -> Result<AuthSession, BackendError> {
        let token = self
            .token
            .ok_or_else(|| BackendError::UnexpectedResponse("login response has no token".to_string()))?;
        let user = self
            .user
            .or_else(|| self.data.map(|d| d.user))
            .ok_or_else(|| BackendError::UnexpectedResponse("login response has no user".to_string()))?;
        Ok(AuthSession { token, user })
    }
}

impl BackendClient {
    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] or [`BackendError::Api`] for
    /// bad credentials, carrying the backend's message.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let body = LoginRequest { email, password };
        let response: TokenResponse = self
            .fetch(self.http().post(self.url("/auth/login")).json(&body))
            .await?;
        response.into_session()
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] if the backend rejects the registration
    /// (for example, the email is taken).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), BackendError> {
        self.execute(self.http().post(self.url("/auth/register")).json(request))
            .await?;
        Ok(())
    }

    /// Exchange a Google ID token for a backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the ID token.
    #[instrument(skip(self, id_token))]
    pub async fn google_login(&self, id_token: &str) -> Result<AuthSession, BackendError> {
        let body = GoogleTokenRequest { token: id_token };
        let response: TokenResponse = self
            .fetch(self.http().post(self.url("/auth/google-token")).json(&body))
            .await?;
        response.into_session()
    }

    /// Fetch the user a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] if the token is invalid or
    /// expired.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &str) -> Result<User, BackendError> {
        let response: Envelope<User> = self
            .fetch(self.http().get(self.url("/auth/me")).bearer_auth(token))
            .await?;
        Ok(response.data)
    }

    /// Tell the backend the token is no longer in use. Failures are logged
    /// and ignored; the local session is cleared regardless.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) {
        if let Err(e) = self
            .execute(self.http().post(self.url("/auth/logout")).bearer_auth(token))
            .await
        {
            warn!(error = %e, "Backend logout failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_password_login_shape() {
        let response: TokenResponse = serde_json::from_value(json!({
            "success": true,
            "token": "tok",
            "user": { "_id": "u1", "name": "Ayesha", "email": "a@example.com", "role": "admin" }
        }))
        .unwrap();
        let session = response.into_session().unwrap();
        assert_eq!(session.token, "tok");
        assert!(session.user.role.is_admin());
    }

    #[test]
    fn test_google_login_shape() {
        let response: TokenResponse = serde_json::from_value(json!({
            "token": "tok",
            "data": { "user": { "_id": "u2", "email": "g@example.com" } }
        }))
        .unwrap();
        let session = response.into_session().unwrap();
        assert_eq!(session.user.id.as_str(), "u2");
    }

    #[test]
    fn test_missing_token_is_unexpected() {
        let response: TokenResponse = serde_json::from_value(json!({
            "user": { "_id": "u1", "email": "a@example.com" }
        }))
        .unwrap();
        assert!(matches!(
            response.into_session(),
            Err(BackendError::UnexpectedResponse(_))
        ));
    }
}
