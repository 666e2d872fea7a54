//! Request descriptor type

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AUTHORIZATION, Headers, HttpMethod, RequestBody, bearer};
use crate::error::{DomainError, DomainResult};

/// Everything needed to (re)issue one call against the backend.
///
/// The path is relative to the client's base URL (e.g. `exercises/bygroup/back`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Identifier used to correlate log lines for one logical call
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL
    pub path: String,
    /// Headers set explicitly by the caller
    #[serde(default)]
    pub headers: Headers,
    /// Request body in logical form
    #[serde(default)]
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request without body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            headers: Headers::new(),
            body: RequestBody::none(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn post<T: Serialize>(path: impl Into<String>, payload: &T) -> DomainResult<Self> {
        Self::new(HttpMethod::Post, path).with_json(payload)
    }

    /// Creates a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn put<T: Serialize>(path: impl Into<String>, payload: &T) -> DomainResult<Self> {
        Self::new(HttpMethod::Put, path).with_json(payload)
    }

    /// Replaces the body with a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, payload: &T) -> DomainResult<Self> {
        self.body = RequestBody::json(payload)?;
        Ok(self)
    }

    /// Sets a header on the request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns a copy carrying `access_token` as its bearer credential.
    ///
    /// Everything else (id, method, path, body, other headers) is kept.
    #[must_use]
    pub fn with_bearer(&self, access_token: &str) -> Self {
        let mut request = self.clone();
        request.headers.set(AUTHORIZATION, bearer(access_token));
        request
    }

    /// Returns the `Authorization` header value, if set.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION)
    }

    /// Checks that the path is usable relative to a base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or absolute.
    pub fn validate(&self) -> DomainResult<()> {
        let path = self.path.trim();
        if path.is_empty() || path.starts_with('/') || path.contains("://") {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        Ok(())
    }
}
