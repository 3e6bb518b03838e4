//! Authentication capability injected into the HTTP gateway.
//!
//! The gateway never talks to the identity provider directly; it goes through
//! this trait so handlers stay testable with a fake implementation.

use axum::http::HeaderMap;
use serde::Deserialize;

use super::error::DomainError;
use super::user::UserProfile;

/// Redirect that starts the provider login flow.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    /// Fully-formed authorization URL on the provider.
    pub location: String,
    /// `Set-Cookie` value carrying the transient `state`/`nonce` pair.
    pub transient_cookie: String,
}

/// Result of completing a login or a logout: where to send the browser and
/// which cookies to set (or clear) on the way.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub location: String,
    pub cookies: Vec<String>,
}

/// Parameters posted back by the provider to the callback route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub id_token: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// The auth collaborator: owns session decoding and the provider round-trips.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Decode the session carried by the request, if any. Absent or invalid
    /// sessions are simply unauthenticated, never an error.
    fn current_user(&self, headers: &HeaderMap) -> Option<UserProfile>;

    /// Build the redirect that sends the browser to the provider.
    fn begin_login(&self) -> Result<LoginRedirect, DomainError>;

    /// Validate the provider's callback and mint the session cookie.
    async fn complete_login(
        &self,
        params: CallbackParams,
        headers: &HeaderMap,
    ) -> Result<SessionUpdate, DomainError>;

    /// Clear the session.
    fn logout(&self) -> SessionUpdate;
}
