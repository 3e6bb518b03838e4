//! Production [`Authenticator`] backed by an OpenID Connect provider.
//!
//! Runs the implicit `id_token` flow with `form_post` response mode: `/login`
//! redirects to the provider, the provider posts the signed ID token back to
//! `/callback`, and a validated token becomes a signed session cookie.

use std::collections::HashMap;

use axum::http::HeaderMap;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::config::OidcConfig;
use crate::domain::{
    Authenticator, CallbackParams, DomainError, LoginRedirect, SessionUpdate, UserProfile,
};

use super::discovery::{fetch_decoding_keys, fetch_discovery, DiscoveryDocument};
use super::session::{
    clear_session_cookie, clear_transient_cookie, read_cookie, SessionCodec, SESSION_COOKIE,
    TRANSIENT_COOKIE,
};

/// Claims this gateway reads out of a verified ID token. Issuer, audience,
/// and expiry are checked by the JWT validation itself.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    nonce: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    picture: String,
}

pub struct OidcAuthenticator {
    config: OidcConfig,
    discovery: DiscoveryDocument,
    keys: HashMap<String, DecodingKey>,
    session: SessionCodec,
}

impl std::fmt::Debug for OidcAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `DecodingKey`/`SessionCodec` hold opaque key material and do not
        // implement `Debug`; report the field count instead.
        f.debug_struct("OidcAuthenticator")
            .field("config", &self.config)
            .field("discovery", &self.discovery)
            .field("keys", &self.keys.len())
            .finish_non_exhaustive()
    }
}

impl OidcAuthenticator {
    /// Resolve the provider's endpoints and signing keys. Called once at
    /// startup; any failure here aborts the process before it accepts traffic.
    pub async fn connect(config: OidcConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let client = reqwest::Client::new();
        let discovery = fetch_discovery(&client, &config.issuer_base_url).await?;
        let keys = fetch_decoding_keys(&client, &discovery.jwks_uri).await?;

        info!(
            issuer = %discovery.issuer,
            keys = keys.len(),
            "Connected to OpenID Connect provider"
        );

        Ok(Self {
            session: SessionCodec::new(&config.secret),
            config,
            discovery,
            keys,
        })
    }

    fn redirect_uri(&self) -> String {
        format!("{}/callback", self.config.base_url.trim_end_matches('/'))
    }

    fn verify_id_token(&self, token: &str, nonce: &str) -> Result<UserProfile, DomainError> {
        let header = decode_header(token)
            .map_err(|e| DomainError::token_verification(format!("invalid ID token: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| DomainError::token_verification("ID token missing 'kid' header"))?;
        let key = self.keys.get(&kid).ok_or_else(|| {
            DomainError::token_verification(format!("key '{kid}' not found in provider JWKS"))
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.discovery.issuer.as_str()]);
        validation.set_audience(&[self.config.client_id.as_str()]);

        let data = decode::<IdTokenClaims>(token, key, &validation)
            .map_err(|e| DomainError::token_verification(e.to_string()))?;

        if data.claims.nonce.as_deref() != Some(nonce) {
            return Err(DomainError::token_verification("nonce mismatch"));
        }

        Ok(UserProfile {
            name: data.claims.name,
            nickname: data.claims.nickname,
            email: data.claims.email,
            picture: data.claims.picture,
        })
    }
}

#[async_trait::async_trait]
impl Authenticator for OidcAuthenticator {
    fn current_user(&self, headers: &HeaderMap) -> Option<UserProfile> {
        let token = read_cookie(headers, SESSION_COOKIE)?;
        self.session.decode_session(&token)
    }

    fn begin_login(&self) -> Result<LoginRedirect, DomainError> {
        let state = random_token();
        let nonce = random_token();

        let mut location = Url::parse(&self.discovery.authorization_endpoint)
            .map_err(|e| DomainError::internal(format!("invalid authorization endpoint: {e}")))?;
        location
            .query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri())
            .append_pair("response_type", "id_token")
            .append_pair("response_mode", "form_post")
            .append_pair("scope", "openid profile email")
            .append_pair("state", &state)
            .append_pair("nonce", &nonce);

        Ok(LoginRedirect {
            location: location.into(),
            transient_cookie: self.session.issue_transient(&state, &nonce)?,
        })
    }

    async fn complete_login(
        &self,
        params: CallbackParams,
        headers: &HeaderMap,
    ) -> Result<SessionUpdate, DomainError> {
        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or_default();
            return Err(DomainError::unauthorized(format!(
                "provider rejected the login: {error} {description}"
            )));
        }

        let id_token = params
            .id_token
            .ok_or_else(|| DomainError::token_verification("callback missing id_token"))?;
        let state = params
            .state
            .ok_or_else(|| DomainError::token_verification("callback missing state"))?;

        let transient = read_cookie(headers, TRANSIENT_COOKIE)
            .and_then(|token| self.session.decode_transient(&token))
            .ok_or_else(|| {
                DomainError::token_verification("login verification cookie missing or expired")
            })?;

        if transient.state != state {
            return Err(DomainError::token_verification("state mismatch"));
        }

        let profile = self.verify_id_token(&id_token, &transient.nonce)?;
        info!(email = %profile.email, "User signed in");

        Ok(SessionUpdate {
            location: "/".to_string(),
            cookies: vec![
                self.session.issue_session(&profile)?,
                clear_transient_cookie(),
            ],
        })
    }

    fn logout(&self) -> SessionUpdate {
        // RP-initiated logout when the provider advertises it.
        let location = self
            .discovery
            .end_session_endpoint
            .as_deref()
            .and_then(|end_session| Url::parse(end_session).ok())
            .map(|mut url| {
                url.query_pairs_mut()
                    .append_pair("client_id", &self.config.client_id)
                    .append_pair("post_logout_redirect_uri", &self.config.base_url);
                String::from(url)
            })
            .unwrap_or_else(|| "/".to_string());

        SessionUpdate {
            location,
            cookies: vec![clear_session_cookie()],
        }
    }
}

fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn authenticator(end_session_endpoint: Option<String>) -> OidcAuthenticator {
        let config = OidcConfig {
            secret: "a long, sufficiently random value".to_string(),
            base_url: "http://localhost:3000".to_string(),
            client_id: "client-abc".to_string(),
            issuer_base_url: "https://issuer.example.com".to_string(),
        };
        OidcAuthenticator {
            session: SessionCodec::new(&config.secret),
            discovery: DiscoveryDocument {
                issuer: "https://issuer.example.com".to_string(),
                authorization_endpoint: "https://issuer.example.com/authorize".to_string(),
                jwks_uri: "https://issuer.example.com/.well-known/jwks.json".to_string(),
                end_session_endpoint,
            },
            keys: HashMap::new(),
            config,
        }
    }

    fn cookie_header(set_cookie: &str) -> HeaderMap {
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[test]
    fn test_begin_login_builds_authorization_url() {
        let auth = authenticator(None);
        let redirect = auth.begin_login().unwrap();
        let url = Url::parse(&redirect.location).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(redirect.location.starts_with("https://issuer.example.com/authorize?"));
        assert_eq!(query["client_id"], "client-abc");
        assert_eq!(query["redirect_uri"], "http://localhost:3000/callback");
        assert_eq!(query["response_type"], "id_token");
        assert_eq!(query["response_mode"], "form_post");
        assert_eq!(query["scope"], "openid profile email");
        assert_eq!(query["state"].len(), 32);
        assert_eq!(query["nonce"].len(), 32);
        assert!(redirect.transient_cookie.starts_with("auth_verification="));
    }

    #[test]
    fn test_current_user_without_cookie_is_none() {
        let auth = authenticator(None);
        assert!(auth.current_user(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_current_user_rejects_forged_cookie() {
        let auth = authenticator(None);
        let headers = cookie_header("appSession=not-a-real-token");
        assert!(auth.current_user(&headers).is_none());
    }

    #[tokio::test]
    async fn test_complete_login_surfaces_provider_error() {
        let auth = authenticator(None);
        let params = CallbackParams {
            error: Some("access_denied".to_string()),
            error_description: Some("user cancelled".to_string()),
            ..Default::default()
        };

        let error = auth.complete_login(params, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(error, DomainError::Unauthorized { .. }));
        assert!(error.to_string().contains("access_denied"));
    }

    #[tokio::test]
    async fn test_complete_login_requires_transient_cookie() {
        let auth = authenticator(None);
        let params = CallbackParams {
            id_token: Some("tok".to_string()),
            state: Some("st".to_string()),
            ..Default::default()
        };

        let error = auth.complete_login(params, &HeaderMap::new()).await.unwrap_err();
        assert!(error.to_string().contains("login verification cookie"));
    }

    #[tokio::test]
    async fn test_complete_login_rejects_state_mismatch() {
        let auth = authenticator(None);
        let transient = auth.session.issue_transient("expected", "n").unwrap();
        let params = CallbackParams {
            id_token: Some("tok".to_string()),
            state: Some("forged".to_string()),
            ..Default::default()
        };

        let error = auth
            .complete_login(params, &cookie_header(&transient))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("state mismatch"));
    }

    #[test]
    fn test_logout_clears_session() {
        let update = authenticator(None).logout();
        assert_eq!(update.location, "/");
        assert_eq!(update.cookies.len(), 1);
        assert!(update.cookies[0].starts_with("appSession=;"));
    }

    #[test]
    fn test_logout_uses_provider_end_session_endpoint() {
        let auth = authenticator(Some("https://issuer.example.com/v2/logout".to_string()));
        let update = auth.logout();

        let url = Url::parse(&update.location).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert!(update.location.starts_with("https://issuer.example.com/v2/logout?"));
        assert_eq!(query["client_id"], "client-abc");
        assert_eq!(query["post_logout_redirect_uri"], "http://localhost:3000");
    }
}
