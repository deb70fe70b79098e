/// Error types for the mill API client
use thiserror::Error;

/// Main error type for data source operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-HTTP data source
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Unexpected response status: {0}")]
    Status(u16),

    /// Server rejected the bearer credential (HTTP 401)
    #[error("Not authorized; credential cleared")]
    Unauthorized,

    /// Response body was not the expected JSON envelope
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this failure means the session is gone and chained fetches must stop.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Type alias for Results using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
