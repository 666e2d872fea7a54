//! Session credential types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::user::UserDto;

/// Access token plus the refresh token that can renew it.
///
/// Always replaced as a whole; never patched field by field. The stored
/// form uses the backend's field names (`token`, `refresh_token`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential
    #[serde(rename = "token")]
    pub access_token: String,
    /// Long-lived credential exchanged for a new pair
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns true if a refresh token is available.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Returns a log-safe preview of a credential (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

/// Token field as sent by the backend.
///
/// Some endpoints send the bare string, others wrap it as `{ "token": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum TokenField {
    Plain(String),
    Wrapped { token: String },
}

impl TokenField {
    fn into_inner(self) -> String {
        match self {
            Self::Plain(token) | Self::Wrapped { token } => token,
        }
    }
}

/// Reply of `POST sessions/refresh-token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenResponse {
    token: TokenField,
    refresh_token: TokenField,
}

impl From<RefreshTokenResponse> for TokenPair {
    fn from(response: RefreshTokenResponse) -> Self {
        Self::new(
            response.token.into_inner(),
            response.refresh_token.into_inner(),
        )
    }
}

/// Reply of `POST sessions` (sign-in).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionResponse {
    /// The signed-in user
    pub user: UserDto,
    token: TokenField,
    refresh_token: TokenField,
}

impl SessionResponse {
    /// Splits the reply into the user record and the issued tokens.
    #[must_use]
    pub fn into_parts(self) -> (UserDto, TokenPair) {
        let tokens = TokenPair::new(self.token.into_inner(), self.refresh_token.into_inner());
        (self.user, tokens)
    }
}
