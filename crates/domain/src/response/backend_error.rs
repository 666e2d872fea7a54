//! Structured error bodies returned by the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body the backend attaches to failed responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: Option<String>,
    message: String,
}

/// A failed response that carried a structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    /// HTTP status code of the failed response
    pub status: u16,
    /// Backend message; doubles as the error code for auth failures
    pub message: String,
}

impl BackendError {
    /// Creates a backend error.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Parses a response body into a backend error.
    ///
    /// Only JSON objects with a string `message` field qualify.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Option<Self> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        if parsed.status.as_deref().is_some_and(|s| s != "error") {
            return None;
        }
        Some(Self::new(status, parsed.message))
    }

    /// Returns the auth code if this error asks for a token refresh.
    #[must_use]
    pub fn auth_code(&self) -> Option<AuthErrorCode> {
        AuthErrorCode::parse(&self.message)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {})", self.message, self.status)
    }
}

/// Backend error codes that mean the access token must be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    /// `token.expired`
    Expired,
    /// `token.invalid`
    Invalid,
}

impl AuthErrorCode {
    /// Parses a backend error code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "token.expired" => Some(Self::Expired),
            "token.invalid" => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "token.expired",
            Self::Invalid => "token.invalid",
        }
    }
}
