//! # Payment Error Types
//!
//! Typed error handling for the checkout engine.
//! All gateway operations return `Result<T, PaymentError>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the `details` array PayPal attaches to validation errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing credentials, invalid endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amounts that don't add up or are out of range
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Currency not supported or not matching the configured one
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// OAuth token request rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-2xx answer from the PayPal REST API
    #[error("PayPal API error [{status}] {name}: {message}")]
    Api {
        status: u16,
        name: String,
        message: String,
        debug_id: Option<String>,
        details: Vec<ErrorDetail>,
    },

    /// Order, authorization or capture unknown to PayPal
    #[error("Resource not found: {resource_id}")]
    ResourceNotFound { resource_id: String },

    /// Rate limited by PayPal
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Network/HTTP error communicating with PayPal
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::NetworkError(_) | PaymentError::RateLimited { .. } => true,
            PaymentError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidPrice { .. } => 400,
            PaymentError::UnsupportedCurrency { .. } => 400,
            PaymentError::Authentication(_) => 502,
            PaymentError::Api { status, .. } if (400..500).contains(status) => *status,
            PaymentError::Api { .. } => 502,
            PaymentError::ResourceNotFound { .. } => 404,
            PaymentError::RateLimited { .. } => 429,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }

    /// PayPal's `debug_id`, useful when contacting merchant support
    pub fn debug_id(&self) -> Option<&str> {
        match self {
            PaymentError::Api { debug_id, .. } => debug_id.as_deref(),
            _ => None,
        }
    }

    pub fn invalid_price(message: impl Into<String>) -> Self {
        PaymentError::InvalidPrice {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> PaymentError {
        PaymentError::Api {
            status,
            name: "INVALID_REQUEST".into(),
            message: "Request is not well-formed".into(),
            debug_id: Some("f1b2c3".into()),
            details: vec![],
        }
    }

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::NetworkError("timeout".into()).is_retryable());
        assert!(PaymentError::RateLimited {
            retry_after_secs: 60
        }
        .is_retryable());
        assert!(api_error(503).is_retryable());
        assert!(!api_error(422).is_retryable());
        assert!(!PaymentError::InvalidRequest("bad data".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(
            PaymentError::ResourceNotFound {
                resource_id: "5O190127TN364715T".into()
            }
            .status_code(),
            404
        );
        assert_eq!(api_error(422).status_code(), 422);
        assert_eq!(api_error(500).status_code(), 502);
        assert_eq!(
            PaymentError::Authentication("invalid_client".into()).status_code(),
            502
        );
    }

    #[test]
    fn test_api_error_display_and_debug_id() {
        let err = api_error(400);
        assert_eq!(
            err.to_string(),
            "PayPal API error [400] INVALID_REQUEST: Request is not well-formed"
        );
        assert_eq!(err.debug_id(), Some("f1b2c3"));
        assert_eq!(PaymentError::Internal("x".into()).debug_id(), None);
    }
}
