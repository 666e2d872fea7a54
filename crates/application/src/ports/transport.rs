//! Transport port

use async_trait::async_trait;
use gymtrack_domain::{ApiRequest, ApiResponse};

/// Failures where no HTTP response was obtained at all.
///
/// Messages are kept as strings so the error can be cloned and handed to
/// every caller waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled (bad header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for sending HTTP requests to the backend.
///
/// Implementations return `Ok` for every HTTP status, including 4xx and
/// 5xx; interpreting failed statuses is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained (network failure,
    /// timeout, unencodable request).
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
