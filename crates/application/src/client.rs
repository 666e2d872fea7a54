//! Typed API client.
//!
//! Every call goes through [`ApiClient::execute`], which applies the default
//! bearer and hands the completed call to the refresh coordinator.

use std::sync::Arc;

use gymtrack_domain::{
    ApiRequest, ApiResponse, ExerciseDto, HistoryGroupDto, NewUser, ProfileUpdate,
    SessionResponse, TokenPair, UserDto,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::auth::{SignOutHandle, TokenRefreshCoordinator};
use crate::error::{ApiError, ApiResult};
use crate::ports::{TokenStore, Transport};

/// Client for the GymTrack backend.
///
/// Cheap to clone; clones share the same coordinator.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    coordinator: TokenRefreshCoordinator,
}

impl ApiClient {
    /// Creates a client with its own refresh coordinator.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        let coordinator = TokenRefreshCoordinator::new(Arc::clone(&transport), store);
        Self {
            transport,
            coordinator,
        }
    }

    /// The coordinator guarding this client.
    #[must_use]
    pub const fn coordinator(&self) -> &TokenRefreshCoordinator {
        &self.coordinator
    }

    /// Registers a sign-out callback; see [`TokenRefreshCoordinator::register`].
    pub fn register<F>(&self, callback: F) -> SignOutHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.coordinator.register(callback)
    }

    /// Sends a request, refreshing the access token and replaying if the
    /// backend rejects it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed, the backend cannot be
    /// reached, the backend reports a failure, or the session had to be
    /// ended.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        request.validate()?;
        let request = self.coordinator.authorize(request);
        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            "sending request"
        );

        let result = self.transport.send(&request).await;
        self.coordinator.intercept(&request, result).await.into_result()
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response
            .decode()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST sessions`: exchanges credentials for a user and a token pair.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`]; wrong credentials surface as
    /// [`ApiError::Api`].
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<(UserDto, TokenPair)> {
        let request = ApiRequest::post("sessions", &json!({ "email": email, "password": password }))?;
        let session: SessionResponse = self.fetch(&request).await?;
        Ok(session.into_parts())
    }

    /// `POST users`: creates an account.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn create_user(&self, user: &NewUser) -> ApiResult<()> {
        self.execute(&ApiRequest::post("users", user)?).await?;
        Ok(())
    }

    /// `PUT users`: renames the user and optionally changes the password.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        self.execute(&ApiRequest::put("users", update)?).await?;
        Ok(())
    }

    /// `GET groups`: muscle group names.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn groups(&self) -> ApiResult<Vec<String>> {
        self.fetch(&ApiRequest::get("groups")).await
    }

    /// `GET exercises/bygroup/{group}`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn exercises_by_group(&self, group: &str) -> ApiResult<Vec<ExerciseDto>> {
        self.fetch(&ApiRequest::get(format!("exercises/bygroup/{group}")))
            .await
    }

    /// `GET history/{user_id}`: completed exercises grouped by day.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn history(&self, user_id: &str) -> ApiResult<Vec<HistoryGroupDto>> {
        self.fetch(&ApiRequest::get(format!("history/{user_id}")))
            .await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gymtrack_domain::HttpMethod;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use crate::ports::{StoreError, TransportError};

    /// Answers every call with one canned response and records what it saw.
    struct Canned {
        response: ApiResponse,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Canned {
        fn new(response: ApiResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().push(request.clone());
            Ok(self.response.clone())
        }
    }

    struct Empty;

    #[async_trait]
    impl TokenStore for Empty {
        async fn get(&self) -> Option<TokenPair> {
            None
        }
        async fn save(&self, _tokens: &TokenPair) -> Result<(), StoreError> {
            Ok(())
        }
        async fn remove(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_in_decodes_session() {
        let transport = Canned::new(ApiResponse::json(
            200,
            &json!({
                "user": {"id": "u1", "name": "Ana", "email": "ana@gym.dev", "avatar": null},
                "token": "access-1",
                "refresh_token": "refresh-1"
            }),
        ));
        let client = ApiClient::new(transport.clone(), Arc::new(Empty));

        let (user, tokens) = client.sign_in("ana@gym.dev", "123456").await.unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(tokens, TokenPair::new("access-1", "refresh-1"));
        let seen = transport.seen.lock();
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].path, "sessions");
        assert_eq!(
            seen[0].body.as_json(),
            Some(&json!({"email": "ana@gym.dev", "password": "123456"}))
        );
    }

    #[tokio::test]
    async fn test_default_bearer_is_applied() {
        let transport = Canned::new(ApiResponse::json(200, &json!(["costas", "ombro"])));
        let client = ApiClient::new(transport.clone(), Arc::new(Empty));
        client.coordinator().set_access_token(Some("access-1"));

        let groups = client.groups().await.unwrap();

        assert_eq!(groups, vec!["costas", "ombro"]);
        assert_eq!(
            transport.seen.lock()[0].authorization(),
            Some("Bearer access-1")
        );
    }

    #[tokio::test]
    async fn test_backend_message_is_surfaced() {
        let transport = Canned::new(ApiResponse::json(
            401,
            &json!({"status": "error", "message": "E-mail e/ou senha incorreta."}),
        ));
        let client = ApiClient::new(transport, Arc::new(Empty));

        let error = client.sign_in("ana@gym.dev", "wrong").await.unwrap_err();

        assert_eq!(error.app_message(), Some("E-mail e/ou senha incorreta."));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let transport = Canned::new(ApiResponse::new(200, "not json"));
        let client = ApiClient::new(transport, Arc::new(Empty));

        let error = client.groups().await.unwrap_err();
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_invalid_path_is_rejected_before_sending() {
        let transport = Canned::new(ApiResponse::new(200, "[]"));
        let client = ApiClient::new(transport.clone(), Arc::new(Empty));

        let error = client
            .execute(&ApiRequest::get("https://elsewhere.dev/groups"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Domain(_)));
        assert!(transport.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_history_path_includes_user() {
        let transport = Canned::new(ApiResponse::json(
            200,
            &json!([{
                "title": "26.08.22",
                "data": [{"id": "h1", "name": "Puxada frontal", "group": "costas", "hour": "10:12"}]
            }]),
        ));
        let client = ApiClient::new(transport.clone(), Arc::new(Empty));

        let sections = client.history("u1").await.unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].data[0].name, "Puxada frontal");
        assert_eq!(transport.seen.lock()[0].path, "history/u1");
    }
}
