//! # Shop Error Types
//!
//! Typed error handling for the storefront backend.
//! Every adapter (payment provider, mail transport, table reader) returns
//! `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("{0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Outbound mail could not be built or delivered
    #[error("Mail error: {0}")]
    Mail(String),

    /// Database query or connection failure
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::ProviderError { .. } => 500,
            ShopError::NetworkError(_) => 500,
            ShopError::WebhookVerificationFailed(_) => 400,
            ShopError::WebhookParseError(_) => 400,
            ShopError::Mail(_) => 500,
            ShopError::Database(_) => 500,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::WebhookParseError("x".into()).status_code(), 400);
        assert_eq!(
            ShopError::WebhookVerificationFailed("x".into()).status_code(),
            400
        );
        assert_eq!(ShopError::Mail("x".into()).status_code(), 500);
        assert_eq!(ShopError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_verification_message_is_verbatim() {
        let err = ShopError::WebhookVerificationFailed("Signature mismatch".into());
        assert_eq!(err.to_string(), "Signature mismatch");
    }
}
