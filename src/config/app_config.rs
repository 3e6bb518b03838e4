use serde::Deserialize;

use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub oidc: OidcConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Identity-provider parameters. All four are required; the server refuses to
/// start without them rather than coming up with broken auth.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OidcConfig {
    /// Secret used to sign the session and transient cookies.
    #[serde(default)]
    pub secret: String,
    /// Public base URL of this gateway; the provider redirects back here.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    /// Base URL of the OpenID Connect issuer.
    #[serde(default)]
    pub issuer_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from optional files, `APP__`-prefixed environment
    /// overrides, and the bare environment names (`PORT`, `SECRET`, ...).
    /// Fails when any required identity-provider value is missing.
    pub fn load() -> Result<Self, DomainError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        let mut config: AppConfig = config
            .try_deserialize()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        config.apply_plain_env();
        config.oidc.validate()?;

        Ok(config)
    }

    /// Overlay the un-prefixed environment names used for deployment.
    fn apply_plain_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        for (name, field) in [
            ("SECRET", &mut self.oidc.secret),
            ("BASE_URL", &mut self.oidc.base_url),
            ("CLIENT_ID", &mut self.oidc.client_id),
            ("ISSUER_BASE_URL", &mut self.oidc.issuer_base_url),
        ] {
            if let Ok(value) = std::env::var(name) {
                *field = value;
            }
        }
    }
}

impl OidcConfig {
    /// Check that every required value is present and that the URLs parse.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("SECRET", &self.secret),
            ("BASE_URL", &self.base_url),
            ("CLIENT_ID", &self.client_id),
            ("ISSUER_BASE_URL", &self.issuer_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::configuration(format!(
                    "{name} environment variable is required"
                )));
            }
        }

        for (name, value) in [
            ("BASE_URL", &self.base_url),
            ("ISSUER_BASE_URL", &self.issuer_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                DomainError::configuration(format!("{name} is not a valid URL: {e}"))
            })?;
        }

        Ok(())
    }
}
