//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port using the reqwest library.
//! Request paths are resolved against the configured base URL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gymtrack_application::ports::{Transport, TransportError};
use gymtrack_domain::request::Header;
use gymtrack_domain::{ApiRequest, ApiResponse, Headers, HttpMethod, RequestBody};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::config::ClientConfig;

/// Transport implementation using reqwest.
///
/// Wraps `reqwest::Client` and resolves every request path against one
/// base URL. Every HTTP status is returned as a response; only network
/// level failures become errors.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport for the given base URL and per-request timeout.
    ///
    /// A missing trailing slash on the base URL is added so that paths are
    /// appended to it instead of replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(base_url: Url, timeout_ms: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("GymTrack/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, base_url, timeout_ms))
    }

    /// Creates a transport from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), config.timeout_ms)
    }

    /// Creates a transport around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url, timeout_ms: u64) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            timeout_ms,
        }
    }

    /// The base URL paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request path against the base URL.
    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }

    /// Encodes the logical body. This is the only place it becomes bytes.
    fn build_body(
        builder: reqwest::RequestBuilder,
        body: &RequestBody,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match body {
            RequestBody::None => Ok(builder),
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
                Ok(builder.body(bytes))
            }
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }

        if error.is_builder() {
            return TransportError::InvalidRequest(error.to_string());
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(self.timeout_ms));

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        // Add Content-Type if body has one and not already set
        if let Some(content_type) = request.body.content_type()
            && request.headers.get("content-type").is_none()
        {
            builder = builder.header("Content-Type", content_type);
        }

        builder = Self::build_body(builder, &request.body)?;

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?;

        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
