//! Authentication routes.
//!
//! `/login`, `/logout`, and `/callback` are thin shims over the injected
//! [`Authenticator`]; all protocol work happens behind that trait.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::CallbackParams;

/// Create the authentication router. Mounted at the root so the provider's
/// registered redirect URI (`{base_url}/callback`) lines up.
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/logout", get(logout))
        .route("/callback", post(callback))
}

/// GET /login
///
/// Redirects the browser to the provider's authorization endpoint.
pub async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let redirect = state.authenticator.begin_login()?;
    redirect_with_cookies(&redirect.location, vec![redirect.transient_cookie])
}

/// POST /callback
///
/// The provider posts the ID token back here (`form_post` response mode).
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<CallbackParams>,
) -> Result<Response, ApiError> {
    let update = state.authenticator.complete_login(params, &headers).await?;
    redirect_with_cookies(&update.location, update.cookies)
}

/// GET /logout
///
/// Clears the session cookie and sends the browser home (or to the
/// provider's logout endpoint when it has one).
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let update = state.authenticator.logout();
    redirect_with_cookies(&update.location, update.cookies)
}

fn redirect_with_cookies(location: &str, cookies: Vec<String>) -> Result<Response, ApiError> {
    let mut response = Redirect::to(location).into_response();
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal(format!("invalid cookie value: {e}")))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}
