//! Error types for the Azure DevOps client.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling the Azure DevOps REST API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP transport failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failure inside the middleware stack, including exhausted retries.
    #[error("Request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// The response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API answered with a status of 400 or above.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error payload, or the raw body.
        message: String,
        /// Parsed error payload, when the body was JSON.
        body: Option<Value>,
    },

    /// Client configuration issue such as an unusable base URL.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The API returned data of an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the API reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Check if the API rejected the credentials.
    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Check if this error is potentially retryable.
    ///
    /// Returns `true` for transport failures, throttling and server errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Middleware(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
