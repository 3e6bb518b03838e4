//! Provider discovery and signing-key retrieval.
//!
//! Fetches the issuer's `.well-known/openid-configuration` document and its
//! JWKS, and turns the RSA keys into decoding keys indexed by `kid`.

use std::collections::HashMap;

use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;

use crate::domain::DomainError;

/// OpenID Connect discovery document (the fields this gateway consumes).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Fetch and verify the discovery document for an issuer.
pub async fn fetch_discovery(
    client: &reqwest::Client,
    issuer: &str,
) -> Result<DiscoveryDocument, DomainError> {
    validate_issuer_url(issuer)?;

    let discovery_url = format!(
        "{}/.well-known/openid-configuration",
        issuer.trim_end_matches('/')
    );

    let document: DiscoveryDocument = client
        .get(&discovery_url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| DomainError::discovery(format!("failed to fetch {discovery_url}: {e}")))?
        .json()
        .await
        .map_err(|e| DomainError::discovery(format!("invalid discovery document: {e}")))?;

    if document.issuer.trim_end_matches('/') != issuer.trim_end_matches('/') {
        return Err(DomainError::discovery(format!(
            "issuer mismatch: expected '{}', got '{}'",
            issuer, document.issuer
        )));
    }

    Ok(document)
}

/// Fetch the JWKS and index its RSA keys by key ID.
pub async fn fetch_decoding_keys(
    client: &reqwest::Client,
    jwks_uri: &str,
) -> Result<HashMap<String, DecodingKey>, DomainError> {
    let jwks: JwkSet = client
        .get(jwks_uri)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| DomainError::discovery(format!("failed to fetch JWKS: {e}")))?
        .json()
        .await
        .map_err(|e| DomainError::discovery(format!("invalid JWKS document: {e}")))?;

    let keys = keys_from_jwk_set(&jwks);
    if keys.is_empty() {
        return Err(DomainError::discovery(
            "JWKS contains no usable RSA signing keys",
        ));
    }

    Ok(keys)
}

fn keys_from_jwk_set(jwks: &JwkSet) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();
    for jwk in &jwks.keys {
        if let AlgorithmParameters::RSA(ref rsa) = jwk.algorithm {
            if let Ok(decoding_key) = DecodingKey::from_rsa_components(&rsa.n, &rsa.e) {
                if let Some(kid) = jwk.common.key_id.clone() {
                    keys.insert(kid, decoding_key);
                }
            }
        }
    }
    keys
}

/// Issuers must be https, or plain http for local development hosts.
fn validate_issuer_url(issuer: &str) -> Result<(), DomainError> {
    let url = url::Url::parse(issuer)
        .map_err(|_| DomainError::configuration("ISSUER_BASE_URL is not a valid URL"))?;

    let is_local = matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("::1")
    );
    if url.scheme() != "https" && !is_local {
        return Err(DomainError::configuration("ISSUER_BASE_URL must use HTTPS"));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(DomainError::configuration(
            "ISSUER_BASE_URL must not have a query string or fragment",
        ));
    }

    Ok(())
}
