//! Alpaca-specific error types.

use thiserror::Error;

use crate::error::ExternalApiError;

const PROVIDER: &str = "alpaca";

/// Errors from the Alpaca adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// HTTP request could not be built.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Request refused (insufficient buying power, invalid symbol, bad order).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Credentials missing or refused.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Order, symbol or position not found.
    #[error("Not found: {resource}")]
    NotFound {
        /// Request path that returned 404.
        resource: String,
    },
}

impl From<AlpacaError> for ExternalApiError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Http(message)
            | AlpacaError::Network(message)
            | AlpacaError::JsonParse(message) => Self::Connection {
                provider: PROVIDER,
                message,
            },
            AlpacaError::Api { code, message } => Self::Api {
                provider: PROVIDER,
                code,
                message,
            },
            AlpacaError::Rejected(reason) => Self::Rejected {
                provider: PROVIDER,
                reason,
            },
            AlpacaError::AuthenticationFailed => Self::AuthenticationFailed { provider: PROVIDER },
            AlpacaError::RateLimited { retry_after_secs } => Self::RateLimited {
                provider: PROVIDER,
                retry_after_secs,
            },
            AlpacaError::NotFound { resource } => Self::NotFound {
                provider: PROVIDER,
                resource,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_maps_to_connection() {
        let err: ExternalApiError = AlpacaError::Network("connection refused".to_string()).into();
        assert!(matches!(err, ExternalApiError::Connection { provider: "alpaca", .. }));
    }

    #[test]
    fn auth_maps_to_auth() {
        let err: ExternalApiError = AlpacaError::AuthenticationFailed.into();
        assert_eq!(err, ExternalApiError::AuthenticationFailed { provider: "alpaca" });
    }

    #[test]
    fn rate_limit_keeps_delay() {
        let err: ExternalApiError = AlpacaError::RateLimited {
            retry_after_secs: 60,
        }
        .into();
        assert!(matches!(
            err,
            ExternalApiError::RateLimited {
                retry_after_secs: 60,
                ..
            }
        ));
    }

    #[test]
    fn rejected_keeps_reason() {
        let err: ExternalApiError = AlpacaError::Rejected("insufficient buying power".to_string()).into();
        assert_eq!(
            err.to_string(),
            "alpaca rejected the request: insufficient buying power"
        );
    }

    #[test]
    fn not_found_keeps_resource() {
        let err: ExternalApiError = AlpacaError::NotFound {
            resource: "/v2/orders/abc123".to_string(),
        }
        .into();
        assert!(matches!(err, ExternalApiError::NotFound { ref resource, .. } if resource == "/v2/orders/abc123"));
    }
}
