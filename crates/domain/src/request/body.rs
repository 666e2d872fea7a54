//! HTTP Request body types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Request body held in its logical (structured) form.
///
/// The body is only turned into bytes by the transport adapter at send
/// time. Replaying a request therefore sends the same structured value
/// again rather than a string that would be encoded a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON document
    Json(serde_json::Value),
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Captures a serializable value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns the JSON value, if any.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::None => None,
            Self::Json(value) => Some(value),
        }
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
        }
    }
}
