//! Single-flight access token refresh with request replay.
//!
//! Every completed call is handed to [`TokenRefreshCoordinator::intercept`].
//! Calls rejected with `token.expired` / `token.invalid` either start a
//! refresh cycle (first one in) or queue behind the cycle already running.
//! When the cycle ends, queued calls are woken in arrival order and replay
//! their original request with the new access token; if it fails, they all
//! fail with the same error and the registered sign-out callbacks run once.
//!
//! State and queue share one mutex. It is held only for bookkeeping, never
//! across a network call.

use std::sync::Arc;

use gymtrack_domain::{
    ApiRequest, ApiResponse, HttpMethod, RefreshTokenResponse, RequestBody,
    TokenPair, request::AUTHORIZATION, request::bearer, token_preview,
};
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::classify::{Classification, classify};
use super::queue::{RequestQueue, SlotOutcome, Wakeup};
use super::sign_out::{SignOutHandle, SignOutRegistry};
use crate::error::{ApiError, ApiResult, RefreshError};
use crate::ports::{TokenStore, Transport, TransportError};

/// Backend path that exchanges a refresh token for a new pair.
pub const REFRESH_PATH: &str = "sessions/refresh-token";

/// Whether a refresh cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// No refresh in flight.
    #[default]
    Idle,
    /// A refresh call is in flight; auth failures queue behind it.
    Refreshing,
}

/// What the caller of an intercepted call gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing auth-related happened; the result is forwarded.
    Pass(ApiResult<ApiResponse>),
    /// The call was replayed with a refreshed token; this is the replay's result.
    Retry(ApiResult<ApiResponse>),
    /// The session was torn down.
    Fatal(ApiError),
}

impl Outcome {
    /// Flattens the outcome into the caller-facing result.
    pub fn into_result(self) -> ApiResult<ApiResponse> {
        match self {
            Self::Pass(result) | Self::Retry(result) => result,
            Self::Fatal(error) => Err(error),
        }
    }

    /// Returns true if the session was torn down.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

#[derive(Debug, Default)]
struct Cycle {
    state: RefreshState,
    queue: RequestQueue,
    started: u64,
}

struct Shared {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    cycle: Mutex<Cycle>,
    access_token: RwLock<Option<String>>,
    sign_out: SignOutRegistry,
}

/// Role a failing call takes in the current refresh cycle.
enum Role {
    Driver,
    Waiter(oneshot::Receiver<Wakeup>),
}

/// Coordinates token refresh for one API client.
///
/// Cheap to clone; clones share the same state. Separate instances share
/// nothing.
#[derive(Clone)]
pub struct TokenRefreshCoordinator {
    shared: Arc<Shared>,
}

impl TokenRefreshCoordinator {
    /// Creates a coordinator over the given transport and token store.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                store,
                cycle: Mutex::new(Cycle::default()),
                access_token: RwLock::new(None),
                sign_out: SignOutRegistry::new(),
            }),
        }
    }

    /// Registers a callback run whenever the session must be torn down.
    pub fn register<F>(&self, callback: F) -> SignOutHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.sign_out.register(callback)
    }

    /// Sets or clears the bearer applied to outbound calls.
    pub fn set_access_token(&self, access_token: Option<&str>) {
        *self.shared.access_token.write() = access_token.map(str::to_owned);
    }

    /// Returns the bearer currently applied to outbound calls.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.shared.access_token.read().clone()
    }

    /// Returns the request with the default bearer filled in.
    ///
    /// An `Authorization` header set explicitly on the request wins.
    #[must_use]
    pub fn authorize(&self, request: &ApiRequest) -> ApiRequest {
        match self.access_token() {
            Some(token) if request.authorization().is_none() => request.with_bearer(&token),
            _ => request.clone(),
        }
    }

    /// Current refresh state.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.shared.cycle.lock().state
    }

    /// Number of calls waiting on the running cycle.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.shared.cycle.lock().queue.len()
    }

    /// Number of refresh cycles started so far.
    #[must_use]
    pub fn cycles_started(&self) -> u64 {
        self.shared.cycle.lock().started
    }

    /// Interprets a completed call, refreshing and replaying as needed.
    ///
    /// `request` is the request as it was sent; its body is the logical
    /// form, reused verbatim if the call is replayed.
    pub async fn intercept(
        &self,
        request: &ApiRequest,
        result: Result<ApiResponse, TransportError>,
    ) -> Outcome {
        let error = match classify(result) {
            Classification::Auth { code, error } => {
                debug!(
                    request_id = %request.id,
                    method = %request.method,
                    path = %request.path,
                    code = code.as_str(),
                    "access token rejected"
                );
                error
            }
            other => return Outcome::Pass(other.into_result()),
        };

        if self.shared.store.refresh_token().await.is_none() {
            warn!(request_id = %request.id, "no refresh token stored, signing out");
            self.shared.sign_out.notify();
            return Outcome::Fatal(ApiError::SignedOut(error));
        }

        match self.join_cycle(request) {
            Role::Driver => self.drive(request).await,
            Role::Waiter(slot) => self.wait(request, slot).await,
        }
    }

    fn join_cycle(&self, request: &ApiRequest) -> Role {
        let mut cycle = self.shared.cycle.lock();
        match cycle.state {
            RefreshState::Refreshing => {
                let slot = cycle.queue.push(request.clone());
                debug!(
                    request_id = %request.id,
                    queued = cycle.queue.len(),
                    "waiting for refresh in flight"
                );
                Role::Waiter(slot)
            }
            RefreshState::Idle => {
                cycle.state = RefreshState::Refreshing;
                cycle.started += 1;
                Role::Driver
            }
        }
    }

    async fn drive(&self, request: &ApiRequest) -> Outcome {
        info!(request_id = %request.id, "refreshing access token");

        // The cycle runs on its own task so that dropping this caller never
        // abandons the queue or the refresh call.
        let shared = Arc::clone(&self.shared);
        let cycle = tokio::spawn(async move { shared.run_cycle().await });
        let result = cycle.await.unwrap_or(Err(RefreshError::Aborted));

        match result {
            Ok(tokens) => Outcome::Retry(self.replay(request, &tokens).await),
            Err(error) => Outcome::Fatal(ApiError::RefreshFailed(error)),
        }
    }

    async fn wait(&self, request: &ApiRequest, slot: oneshot::Receiver<Wakeup>) -> Outcome {
        match slot.await {
            Ok(Wakeup {
                request: captured,
                outcome: SlotOutcome::Resolved(tokens),
            }) => Outcome::Retry(self.replay(&captured, &tokens).await),
            Ok(Wakeup {
                outcome: SlotOutcome::Rejected(error),
                ..
            }) => Outcome::Fatal(ApiError::RefreshFailed(error)),
            Err(_) => {
                warn!(request_id = %request.id, "refresh cycle ended without an outcome");
                Outcome::Fatal(ApiError::RefreshFailed(RefreshError::Aborted))
            }
        }
    }

    /// Reissues `request` with the new access token.
    ///
    /// The replay is not intercepted again: a replay rejected with an auth
    /// code is reported as a plain backend error instead of starting
    /// another cycle.
    async fn replay(&self, request: &ApiRequest, tokens: &TokenPair) -> ApiResult<ApiResponse> {
        let replay = request.with_bearer(&tokens.access_token);
        debug!(
            request_id = %replay.id,
            method = %replay.method,
            path = %replay.path,
            "replaying request with refreshed token"
        );
        classify(self.shared.transport.send(&replay).await).into_result()
    }
}

impl std::fmt::Debug for TokenRefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cycle = self.shared.cycle.lock();
        f.debug_struct("TokenRefreshCoordinator")
            .field("state", &cycle.state)
            .field("queued", &cycle.queue.len())
            .field("cycles_started", &cycle.started)
            .field("sign_out", &self.shared.sign_out)
            .finish_non_exhaustive()
    }
}

impl Shared {
    async fn run_cycle(&self) -> Result<TokenPair, RefreshError> {
        let mut guard = CycleGuard {
            shared: self,
            armed: true,
        };

        let result = self.refresh().await;
        match &result {
            Ok(tokens) => {
                *self.access_token.write() = Some(tokens.access_token.clone());
                let woken = guard.finish(&SlotOutcome::Resolved(tokens.clone()));
                info!(
                    access_token = %token_preview(&tokens.access_token),
                    woken,
                    "access token refreshed"
                );
            }
            Err(error) => {
                let woken = guard.finish(&SlotOutcome::Rejected(error.clone()));
                warn!(%error, woken, "token refresh failed, signing out");
                self.sign_out.notify();
            }
        }
        result
    }

    async fn refresh(&self) -> Result<TokenPair, RefreshError> {
        // Read inside the cycle: an earlier cycle may have rotated the token.
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .ok_or(RefreshError::MissingRefreshToken)?;

        let mut request = ApiRequest::new(HttpMethod::Post, REFRESH_PATH);
        request.body = RequestBody::Json(json!({ "token": refresh_token }));
        if let Some(token) = self.access_token.read().as_deref() {
            request.headers.set(AUTHORIZATION, bearer(token));
        }

        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(response.backend_error().map_or(
                RefreshError::UnexpectedStatus {
                    status: response.status,
                },
                RefreshError::Rejected,
            ));
        }

        let tokens: TokenPair = response
            .decode::<RefreshTokenResponse>()
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?
            .into();
        self.store.save(&tokens).await?;
        Ok(tokens)
    }
}

/// Ends the cycle exactly once: drains the queue and returns to `Idle`.
///
/// If the cycle is torn down before `finish` (panic inside the refresh),
/// dropping the guard rejects every queued call with
/// [`RefreshError::Aborted`].
struct CycleGuard<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl CycleGuard<'_> {
    fn finish(&mut self, outcome: &SlotOutcome) -> usize {
        self.armed = false;
        let mut cycle = self.shared.cycle.lock();
        let woken = cycle.queue.drain(outcome);
        cycle.state = RefreshState::Idle;
        woken
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.finish(&SlotOutcome::Rejected(RefreshError::Aborted));
        }
    }
}
