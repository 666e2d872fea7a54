//! Application error types

use gymtrack_domain::{BackendError, DomainError};
use thiserror::Error;

use crate::ports::{StoreError, TransportError};

/// Why a token refresh cycle failed.
///
/// Cloned once per waiting caller, so every variant carries owned data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The refresh endpoint could not be reached.
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),

    /// The backend refused the refresh token.
    #[error("refresh token rejected: {0}")]
    Rejected(BackendError),

    /// The refresh endpoint answered with an unstructured failure.
    #[error("refresh endpoint answered HTTP {status}")]
    UnexpectedStatus {
        /// HTTP status of the reply
        status: u16,
    },

    /// The refresh endpoint answered 2xx with an unusable body.
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The refresh token disappeared from the store before the cycle ran.
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The new pair could not be persisted.
    #[error("could not persist refreshed tokens: {0}")]
    Store(#[from] StoreError),

    /// The cycle ended without reporting an outcome.
    #[error("refresh cycle aborted")]
    Aborted,
}

/// Errors surfaced to callers of the API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A failed response without a structured error body.
    #[error("unexpected response status {status}")]
    Status {
        /// HTTP status
        status: u16,
        /// Raw body text
        body: String,
    },

    /// A structured backend error unrelated to token expiry.
    #[error("{message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Backend message, suitable for display
        message: String,
    },

    /// The access token could not be refreshed; the session was ended.
    #[error("session expired: {0}")]
    RefreshFailed(#[from] RefreshError),

    /// The access token was rejected and no refresh token was available.
    #[error("signed out after {0}")]
    SignedOut(BackendError),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),

    /// A successful response carried an unexpected body.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Local session storage failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Returns the backend message when the error is an application error.
    ///
    /// Screens show this text directly and fall back to their own wording
    /// for every other kind of failure.
    #[must_use]
    pub fn app_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns true if the error ended the session.
    ///
    /// An aborted cycle leaves the session in place: the stored refresh
    /// token was never rejected.
    #[must_use]
    pub const fn ended_session(&self) -> bool {
        match self {
            Self::RefreshFailed(RefreshError::Aborted) => false,
            Self::RefreshFailed(_) | Self::SignedOut(_) => true,
            _ => false,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(error: BackendError) -> Self {
        Self::Api {
            status: error.status,
            message: error.message,
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
