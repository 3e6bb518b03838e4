//! OIDC Greeter
//!
//! A single-binary HTTP gateway that delegates sign-in to an OpenID Connect
//! provider and renders a personalized greeting for authenticated users.
//! Everything non-trivial (token issuance, CORS semantics, HTTP parsing) is
//! delegated; this crate is the wiring.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::auth::OidcAuthenticator;

/// Create the application state: validate the identity-provider
/// configuration and resolve its endpoints and signing keys. Any failure
/// here is fatal; the server must not come up with broken auth.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let authenticator = OidcAuthenticator::connect(config.oidc.clone()).await?;
    Ok(AppState::new(Arc::new(authenticator)))
}
