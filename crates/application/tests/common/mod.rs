//! In-memory doubles shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gymtrack_application::{
    ApiClient, REFRESH_PATH, StoreError, TokenStore, Transport, TransportError, UserStore,
};
use gymtrack_domain::{ApiRequest, ApiResponse, TokenPair, UserDto};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;

/// How the fake backend answers the refresh endpoint.
#[derive(Debug, Clone)]
pub enum RefreshReply {
    Issue(TokenPair),
    /// Issues the pair but keeps rejecting the new access token.
    IssueUnaccepted(TokenPair),
    Fail(ApiResponse),
    /// The transport task panics mid-refresh.
    Panic,
}

/// Backend double.
///
/// Accepts only `Bearer <valid_token>`; anything else gets
/// `401 token.expired`. `sessions` always signs in, `broken` always answers
/// a 400 application error, `down` always answers a plain 500.
pub struct FakeBackend {
    valid_token: Mutex<String>,
    refresh_reply: Mutex<RefreshReply>,
    gated: AtomicBool,
    gate: Semaphore,
    refresh_calls: AtomicUsize,
    sent: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new(valid_token: &str) -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh_reply: Mutex::new(RefreshReply::Issue(TokenPair::new(
                "access-2",
                "refresh-2",
            ))),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            refresh_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn reply_to_refresh(&self, reply: RefreshReply) {
        *self.refresh_reply.lock() = reply;
    }

    /// Holds every refresh call until [`FakeBackend::open_gate`].
    pub fn close_gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn open_gate(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.gate.add_permits(1024);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().clone()
    }

    pub fn refresh_requests(&self) -> Vec<ApiRequest> {
        self.sent()
            .into_iter()
            .filter(|r| r.path == REFRESH_PATH)
            .collect()
    }

    /// Requests other than refresh calls that carried `Bearer <token>`.
    pub fn sent_with(&self, token: &str) -> Vec<ApiRequest> {
        let expected = format!("Bearer {token}");
        self.sent()
            .into_iter()
            .filter(|r| r.path != REFRESH_PATH && r.authorization() == Some(expected.as_str()))
            .collect()
    }

    async fn refresh(&self) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.gate.acquire().await.unwrap().forget();
        }

        let reply = self.refresh_reply.lock().clone();
        match reply {
            RefreshReply::Issue(tokens) => {
                self.valid_token.lock().clone_from(&tokens.access_token);
                ApiResponse::json(
                    200,
                    &json!({"token": tokens.access_token, "refresh_token": tokens.refresh_token}),
                )
            }
            RefreshReply::IssueUnaccepted(tokens) => ApiResponse::json(
                200,
                &json!({"token": tokens.access_token, "refresh_token": tokens.refresh_token}),
            ),
            RefreshReply::Fail(response) => response,
            RefreshReply::Panic => panic!("refresh transport crashed"),
        }
    }
}

pub fn app_error(status: u16, message: &str) -> ApiResponse {
    ApiResponse::json(status, &json!({"status": "error", "message": message}))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent.lock().push(request.clone());

        let response = match request.path.as_str() {
            REFRESH_PATH => self.refresh().await,
            "sessions" => {
                *self.valid_token.lock() = "access-1".to_string();
                ApiResponse::json(
                    200,
                    &json!({
                        "user": {"id": "u1", "name": "Ana", "email": "ana@gym.dev", "avatar": null},
                        "token": "access-1",
                        "refresh_token": "refresh-1"
                    }),
                )
            }
            "broken" => app_error(400, "Informe o grupo."),
            "down" => ApiResponse::new(500, "Internal Server Error"),
            path => {
                let expected = format!("Bearer {}", self.valid_token.lock());
                if request.authorization() == Some(expected.as_str()) {
                    let body = request.body.as_json().cloned().unwrap_or(Value::Null);
                    ApiResponse::json(200, &json!({"path": path, "body": body}))
                } else {
                    app_error(401, "token.expired")
                }
            }
        };
        Ok(response)
    }
}

/// Token store double.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
    fail_saves: AtomicBool,
}

impl MemoryTokenStore {
    pub fn with(tokens: TokenPair) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(Some(tokens)),
            fail_saves: AtomicBool::new(false),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn current(&self) -> Option<TokenPair> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<TokenPair> {
        self.current()
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io("disk full".into()));
        }
        *self.tokens.lock() = Some(tokens.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<(), StoreError> {
        *self.tokens.lock() = None;
        Ok(())
    }
}

/// User store double.
pub struct MemoryUserStore {
    user: Mutex<Option<UserDto>>,
    gated: AtomicBool,
    gate: Semaphore,
    removes_waiting: AtomicUsize,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            user: Mutex::new(None),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            removes_waiting: AtomicUsize::new(0),
        }
    }
}

impl MemoryUserStore {
    pub fn put(&self, user: UserDto) {
        *self.user.lock() = Some(user);
    }

    pub fn current(&self) -> Option<UserDto> {
        self.user.lock().clone()
    }

    /// Holds every `remove` until [`MemoryUserStore::release_removes`].
    pub fn hold_removes(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release_removes(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.gate.add_permits(1024);
    }

    pub fn removes_waiting(&self) -> usize {
        self.removes_waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self) -> Option<UserDto> {
        self.current()
    }

    async fn save(&self, user: &UserDto) -> Result<(), StoreError> {
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<(), StoreError> {
        if self.gated.load(Ordering::SeqCst) {
            self.removes_waiting.fetch_add(1, Ordering::SeqCst);
            self.gate.acquire().await.unwrap().forget();
        }
        *self.user.lock() = None;
        Ok(())
    }
}

pub fn client(backend: &Arc<FakeBackend>, store: &Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(backend.clone(), store.clone())
}

/// Counts how often a sign-out callback ran.
pub fn sign_out_counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    (count, move || {
        inner.fetch_add(1, Ordering::SeqCst);
    })
}

/// Yields until `condition` holds, failing the test after five seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
