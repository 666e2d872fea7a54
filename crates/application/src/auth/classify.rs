//! Classification of completed calls.

use gymtrack_domain::{ApiResponse, AuthErrorCode, BackendError};

use crate::error::{ApiError, ApiResult};
use crate::ports::TransportError;

/// What a completed call means for the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 2xx response.
    Success(ApiResponse),
    /// No response at all.
    Transport(TransportError),
    /// Failed response without a structured error body.
    Unstructured(ApiResponse),
    /// Structured backend error that does not concern the access token.
    Application(BackendError),
    /// The access token was rejected and must be refreshed.
    Auth {
        /// Which auth code the backend sent
        code: AuthErrorCode,
        /// The error as received
        error: BackendError,
    },
}

/// Classifies a completed call.
///
/// The auth codes are recognised regardless of the HTTP status the backend
/// paired them with.
#[must_use]
pub fn classify(result: Result<ApiResponse, TransportError>) -> Classification {
    let response = match result {
        Ok(response) => response,
        Err(error) => return Classification::Transport(error),
    };

    if response.is_success() {
        return Classification::Success(response);
    }

    match response.backend_error() {
        None => Classification::Unstructured(response),
        Some(error) => match error.auth_code() {
            Some(code) => Classification::Auth { code, error },
            None => Classification::Application(error),
        },
    }
}

impl Classification {
    /// Returns true if the call needs a token refresh.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Converts the classification into the caller-facing result.
    ///
    /// Auth failures become ordinary backend errors here; only the
    /// coordinator decides whether they start a refresh.
    pub fn into_result(self) -> ApiResult<ApiResponse> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Transport(error) => Err(ApiError::Transport(error)),
            Self::Unstructured(response) => Err(ApiError::Status {
                status: response.status,
                body: response.body,
            }),
            Self::Application(error) | Self::Auth { error, .. } => Err(error.into()),
        }
    }
}
