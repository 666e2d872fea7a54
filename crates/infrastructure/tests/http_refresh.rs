//! Refresh and replay over real HTTP, against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use gymtrack_application::{ApiClient, ApiError, AuthSession, TokenStore, TransportError};
use gymtrack_domain::{ApiRequest, TokenPair};
use gymtrack_infrastructure::{FileTokenStore, FileUserStore, ReqwestTransport, TokioFileSystem};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"status": "error", "message": "token.expired"}))
}

fn transport(server: &MockServer, timeout_ms: u64) -> Arc<ReqwestTransport> {
    Arc::new(ReqwestTransport::new(Url::parse(&server.uri()).unwrap(), timeout_ms).unwrap())
}

async fn store_with(dir: &std::path::Path, tokens: TokenPair) -> Arc<FileTokenStore<TokioFileSystem>> {
    let store = Arc::new(FileTokenStore::new(TokioFileSystem::new(), dir));
    store.save(&tokens).await.unwrap();
    store
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_call_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sessions/refresh-token"))
        .and(body_json(json!({"token": "refresh-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "access-2", "refresh_token": "refresh-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["costas", "ombro"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_with(dir.path(), TokenPair::new("access-1", "refresh-1")).await;
    let client = ApiClient::new(transport(&server, 5_000), store.clone());
    client.coordinator().set_access_token(Some("access-1"));

    let groups = client.groups().await.unwrap();

    assert_eq!(groups, vec!["costas", "ombro"]);
    assert_eq!(store.get().await, Some(TokenPair::new("access-2", "refresh-2")));
}

#[tokio::test]
async fn test_concurrent_calls_refresh_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sessions/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "access-2", "refresh_token": "refresh-2"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(4)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_with(dir.path(), TokenPair::new("access-1", "refresh-1")).await;
    let client = ApiClient::new(transport(&server, 5_000), store);
    client.coordinator().set_access_token(Some("access-1"));

    let calls: Vec<_> = ["groups", "exercises/bygroup/costas", "history/u1", "groups"]
        .into_iter()
        .map(|path| {
            let client = client.clone();
            tokio::spawn(async move { client.execute(&ApiRequest::get(path)).await })
        })
        .collect();

    for call in calls {
        assert_eq!(call.await.unwrap().unwrap().status, 200);
    }
    assert_eq!(client.coordinator().cycles_started(), 1);
}

#[tokio::test]
async fn test_rejected_refresh_clears_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "u1", "name": "Ana", "email": "ana@gym.dev", "avatar": null},
            "token": "access-1",
            "refresh_token": "refresh-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history/u1"))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sessions/refresh-token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"status": "error", "message": "token.invalid"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let tokens = Arc::new(FileTokenStore::new(TokioFileSystem::new(), dir.path()));
    let users = Arc::new(FileUserStore::new(TokioFileSystem::new(), dir.path()));
    let client = ApiClient::new(transport(&server, 5_000), tokens.clone());
    let session = AuthSession::new(client, tokens.clone(), users);

    session.sign_in("ana@gym.dev", "123456").await.unwrap();
    assert!(dir.path().join("auth_token.json").exists());
    assert!(dir.path().join("user.json").exists());

    let error = session.client().history("u1").await.unwrap_err();
    assert!(error.ended_session());
    assert!(!session.is_signed_in());

    tokio::time::timeout(Duration::from_secs(5), async {
        while dir.path().join("auth_token.json").exists() || dir.path().join("user.json").exists()
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("stored session should be erased");
}

#[tokio::test]
async fn test_transport_reports_every_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exercises/bygroup/pernas"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"status": "error", "message": "Grupo não encontrado."})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(TokioFileSystem::new(), dir.path()));
    let client = ApiClient::new(transport(&server, 5_000), store);

    let error = client.exercises_by_group("pernas").await.unwrap_err();
    assert_eq!(
        error,
        ApiError::Api {
            status: 404,
            message: "Grupo não encontrado.".into()
        }
    );
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(TokioFileSystem::new(), dir.path()));
    let client = ApiClient::new(transport(&server, 50), store);

    let error = client.execute(&ApiRequest::get("groups")).await.unwrap_err();
    assert_eq!(
        error,
        ApiError::Transport(TransportError::Timeout { timeout_ms: 50 })
    );
}
