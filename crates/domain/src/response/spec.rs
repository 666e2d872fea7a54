//! Response type

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::BackendError;
use crate::request::Headers;

/// A completed HTTP exchange, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// Creates a response without headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Creates a response whose body is the given JSON value.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string());
        response.headers.set("Content-Type", "application/json");
        response
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Extracts the structured backend error carried by a failed response.
    ///
    /// Returns `None` for successful responses and for failures whose body
    /// is not the backend's `{ "status": ..., "message": ... }` shape.
    #[must_use]
    pub fn backend_error(&self) -> Option<BackendError> {
        if self.is_success() {
            return None;
        }
        BackendError::from_body(self.status, &self.body)
    }
}
