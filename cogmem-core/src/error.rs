//! Error types for cogmem-core.

use thiserror::Error;

/// Result type alias using cogmem-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for memory service operations
#[derive(Error, Debug)]
pub enum Error {
    // Remote service errors
    #[error("Memory service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Memory service error {status}: {body}")]
    Service { status: u16, body: String },

    // Caller errors, raised before any request is sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unavailable error from any displayable cause
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create an error for a non-2xx response
    pub fn service(status: u16, body: impl Into<String>) -> Self {
        Self::Service {
            status,
            body: body.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Timeouts and unreachability both mean "no memory this turn"
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::service_unavailable(format!("request timed out: {}", e))
        } else if e.is_connect() || e.is_request() {
            Error::service_unavailable(e.to_string())
        } else if e.is_decode() || e.is_body() {
            Error::Serialization(e.to_string())
        } else if let Some(status) = e.status() {
            Error::service(status.as_u16(), e.to_string())
        } else {
            Error::service_unavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
