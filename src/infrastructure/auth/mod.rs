//! OpenID Connect relying-party integration.
//!
//! Owns the provider round-trips (discovery, JWKS, ID-token verification) and
//! the signed cookies that carry the session between requests.

pub mod discovery;
pub mod oidc;
pub mod session;

pub use oidc::OidcAuthenticator;
