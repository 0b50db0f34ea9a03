//! Client error types.

use genai_kit_core::GenAiError;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`GenAiClient`](crate::GenAiClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status without a decodable error body.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
        /// Response headers.
        headers: HashMap<String, String>,
    },

    /// Error reported by the API in its error envelope.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Error status string, e.g. `INVALID_ARGUMENT`.
        code: Option<String>,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay.
        retry_after: Option<Duration>,
    },

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response had an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClientError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Create an API error with a status code string.
    pub fn api_with_code(status: u16, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Whether retrying the same call could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited { .. } => true,
            Self::Http { status, .. } | Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(Duration::from_secs(120))
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Other(err.into())
        }
    }
}

/// Every transport failure surfaces as an API error to callers.
impl From<ClientError> for GenAiError {
    fn from(err: ClientError) -> Self {
        GenAiError::api_with_source(err.to_string(), err)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(ClientError::http(503, "down").status(), Some(503));
        assert_eq!(ClientError::api(400, "bad").status(), Some(400));
        assert_eq!(ClientError::RateLimited { retry_after: None }.status(), Some(429));
        assert_eq!(ClientError::Timeout(Duration::from_secs(1)).status(), None);
    }

    #[test]
    fn test_is_transient() {
        assert!(ClientError::Connection("refused".into()).is_transient());
        assert!(ClientError::http(502, "bad gateway").is_transient());
        assert!(!ClientError::api(400, "invalid").is_transient());
        assert!(!ClientError::Authentication("bad key".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::api_with_code(400, "Invalid model", "INVALID_ARGUMENT");
        assert_eq!(err.to_string(), "API error (400): Invalid model");

        let err = ClientError::http(404, "Not found");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_into_genai_error() {
        let err: GenAiError = ClientError::NotFound("files/x".into()).into();
        assert!(err.is_api());
        assert_eq!(err.message(), "Not found: files/x");
        assert!(std::error::Error::source(&err).is_some());
    }
}
