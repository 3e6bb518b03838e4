//! Stateless session and login-verification cookies.
//!
//! The session is an HS256 JWT carrying the user profile, signed with the
//! configured secret. Nothing is stored server-side; possession of a validly
//! signed cookie IS the session.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, UserProfile};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "appSession";
/// Transient cookie carrying `state`/`nonce` between `/login` and `/callback`.
pub const TRANSIENT_COOKIE: &str = "auth_verification";

const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const TRANSIENT_TTL_SECONDS: i64 = 10 * 60;

/// Claims stored in the session cookie.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    profile: UserProfile,
    iat: i64,
    exp: i64,
}

/// Claims stored in the transient login-verification cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransientState {
    pub state: String,
    pub nonce: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies the cookies this gateway issues.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint the session cookie for a freshly authenticated user.
    pub fn issue_session(&self, profile: &UserProfile) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = SessionClaims {
            profile: profile.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(SESSION_TTL_SECONDS)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("failed to sign session: {e}")))?;

        Ok(cookie(SESSION_COOKIE, &token, SESSION_TTL_SECONDS))
    }

    /// Decode a session token. Invalid, expired, or tampered tokens are
    /// unauthenticated, never an error.
    pub fn decode_session(&self, token: &str) -> Option<UserProfile> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| tracing::debug!("rejecting session cookie: {e}"))
            .ok()
            .map(|data| data.claims.profile)
    }

    /// Mint the short-lived cookie that pins `state` and `nonce` to the
    /// browser that started the login.
    pub fn issue_transient(&self, state: &str, nonce: &str) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = TransientState {
            state: state.to_string(),
            nonce: nonce.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TRANSIENT_TTL_SECONDS)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("failed to sign login state: {e}")))?;

        Ok(cookie(TRANSIENT_COOKIE, &token, TRANSIENT_TTL_SECONDS))
    }

    pub fn decode_transient(&self, token: &str) -> Option<TransientState> {
        decode::<TransientState>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| tracing::debug!("rejecting login-verification cookie: {e}"))
            .ok()
            .map(|data| data.claims)
    }
}

/// Build a `Set-Cookie` value.
fn cookie(name: &str, value: &str, max_age: i64) -> String {
    format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    cookie(SESSION_COOKIE, "", 0)
}

pub fn clear_transient_cookie() -> String {
    cookie(TRANSIENT_COOKIE, "", 0)
}

/// Read a cookie value out of the request headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn codec() -> SessionCodec {
        SessionCodec::new("a long, sufficiently random value")
    }

    fn ada() -> UserProfile {
        UserProfile {
            name: "Ada Lovelace".to_string(),
            nickname: "ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: "http://x/p.png".to_string(),
        }
    }

    fn token_of(set_cookie: &str) -> &str {
        let pair = set_cookie.split(';').next().unwrap();
        pair.split_once('=').unwrap().1
    }

    #[test]
    fn test_session_round_trip() {
        let codec = codec();
        let set_cookie = codec.issue_session(&ada()).unwrap();

        assert!(set_cookie.starts_with("appSession="));
        assert!(set_cookie.contains("HttpOnly"));

        let decoded = codec.decode_session(token_of(&set_cookie)).unwrap();
        assert_eq!(decoded, ada());
    }

    #[test]
    fn test_tampered_session_is_rejected() {
        let codec = codec();
        let set_cookie = codec.issue_session(&ada()).unwrap();
        let mut token = token_of(&set_cookie).to_string();
        token.replace_range(token.len() - 4.., "AAAA");

        assert!(codec.decode_session(&token).is_none());
    }

    #[test]
    fn test_session_from_other_secret_is_rejected() {
        let set_cookie = codec().issue_session(&ada()).unwrap();
        let other = SessionCodec::new("a completely different secret");

        assert!(other.decode_session(token_of(&set_cookie)).is_none());
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let codec = codec();
        let now = Utc::now();
        let claims = SessionClaims {
            profile: ada(),
            iat: (now - Duration::hours(48)).timestamp(),
            exp: (now - Duration::hours(24)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &codec.encoding_key).unwrap();

        assert!(codec.decode_session(&token).is_none());
    }

    #[test]
    fn test_transient_round_trip() {
        let codec = codec();
        let set_cookie = codec.issue_transient("st-123", "n-456").unwrap();
        let decoded = codec.decode_transient(token_of(&set_cookie)).unwrap();

        assert_eq!(decoded.state, "st-123");
        assert_eq!(decoded.nonce, "n-456");
    }

    #[test]
    fn test_read_cookie_from_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; appSession=tok-abc; theme=dark"),
        );

        assert_eq!(read_cookie(&headers, "appSession").unwrap(), "tok-abc");
        assert_eq!(read_cookie(&headers, "theme").unwrap(), "dark");
        assert!(read_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_clear_cookies_expire_immediately() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
        assert!(clear_transient_cookie().contains("Max-Age=0"));
    }
}
