use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Discovery error: {message}")]
    Discovery { message: String },

    #[error("Token verification failed: {message}")]
    TokenVerification { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    pub fn token_verification(message: impl Into<String>) -> Self {
        Self::TokenVerification {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("SECRET environment variable is required");
        assert_eq!(
            error.to_string(),
            "Configuration error: SECRET environment variable is required"
        );
    }

    #[test]
    fn test_token_verification_error() {
        let error = DomainError::token_verification("nonce mismatch");
        assert_eq!(
            error.to_string(),
            "Token verification failed: nonce mismatch"
        );
    }
}
