//! Signed-in session state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use gymtrack_domain::{ProfileUpdate, UserDto, token_preview};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::SignOutHandle;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::ports::{TokenStore, UserStore};

struct SessionInner {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn UserStore>,
    user: RwLock<Option<UserDto>>,
    /// Serializes writes to the stores.
    storage: Mutex<()>,
    /// Bumped whenever the stored session is replaced or erased.
    generation: AtomicU64,
}

impl SessionInner {
    fn forget(&self) {
        *self.user.write() = None;
        self.client.coordinator().set_access_token(None);
    }

    async fn erase(&self) -> ApiResult<()> {
        self.users.remove().await?;
        self.tokens.remove().await?;
        Ok(())
    }

    /// Erases the stored session unless it was replaced after `generation`
    /// was observed.
    async fn erase_unless_replaced(&self, generation: u64) -> ApiResult<()> {
        let _storage = self.storage.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("stored session replaced since sign-out, keeping it");
            return Ok(());
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.erase().await
    }
}

/// The signed-in user and the credentials behind it.
///
/// Registers itself with the client's refresh coordinator so that a failed
/// refresh signs the user out. The registration is removed by
/// [`AuthSession::detach`] or on drop.
pub struct AuthSession {
    inner: Arc<SessionInner>,
    registration: SignOutHandle,
}

impl AuthSession {
    /// Creates a signed-out session over the given client and stores.
    ///
    /// `tokens` must be the store the client refreshes into.
    #[must_use]
    pub fn new(client: ApiClient, tokens: Arc<dyn TokenStore>, users: Arc<dyn UserStore>) -> Self {
        let inner = Arc::new(SessionInner {
            client,
            tokens,
            users,
            user: RwLock::new(None),
            storage: Mutex::new(()),
            generation: AtomicU64::new(0),
        });

        let weak: Weak<SessionInner> = Arc::downgrade(&inner);
        let registration = inner.client.register(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.forget();
            let generation = inner.generation.load(Ordering::SeqCst);
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        if let Err(error) = inner.erase_unless_replaced(generation).await {
                            warn!(%error, "could not clear stored session");
                        }
                    });
                }
                Err(_) => warn!("no runtime to clear stored session on"),
            }
        });

        Self {
            inner,
            registration,
        }
    }

    /// Restores the session persisted by an earlier sign-in.
    ///
    /// The bearer is only primed when both the user and the tokens are
    /// present.
    pub async fn load(&self) -> Option<UserDto> {
        let user = self.inner.users.get().await?;
        let tokens = self.inner.tokens.get().await?;

        self.inner
            .client
            .coordinator()
            .set_access_token(Some(&tokens.access_token));
        *self.inner.user.write() = Some(user.clone());
        info!(user_id = %user.id, "session restored");
        Some(user)
    }

    /// Signs in and persists the user and the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns the backend's error for wrong credentials, or a storage error
    /// if the session cannot be persisted.
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<UserDto> {
        let (user, tokens) = self.inner.client.sign_in(email, password).await?;

        let _storage = self.inner.storage.lock().await;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.users.save(&user).await?;
        self.inner.tokens.save(&tokens).await?;
        self.inner
            .client
            .coordinator()
            .set_access_token(Some(&tokens.access_token));
        *self.inner.user.write() = Some(user.clone());

        info!(
            user_id = %user.id,
            access_token = %token_preview(&tokens.access_token),
            "signed in"
        );
        Ok(user)
    }

    /// Forgets the user and erases the stored session. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored records cannot be removed.
    pub async fn sign_out(&self) -> ApiResult<()> {
        self.inner.forget();
        let _storage = self.inner.storage.lock().await;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.erase().await?;
        info!("signed out");
        Ok(())
    }

    /// Replaces the cached and stored user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub async fn update_user_profile(&self, user: UserDto) -> ApiResult<()> {
        let _storage = self.inner.storage.lock().await;
        self.inner.users.save(&user).await?;
        *self.inner.user.write() = Some(user);
        Ok(())
    }

    /// Sends a profile update, then applies it to the cached user.
    ///
    /// # Errors
    ///
    /// Returns the backend's error (e.g. wrong current password) or a storage
    /// error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Option<UserDto>> {
        self.inner.client.update_profile(update).await?;

        let updated = self.current_user().map(|mut user| {
            update.apply_to(&mut user);
            user
        });
        if let Some(user) = &updated {
            self.update_user_profile(user.clone()).await?;
        }
        Ok(updated)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserDto> {
        self.inner.user.read().clone()
    }

    /// Returns true while a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.user.read().is_some()
    }

    /// The client this session signs in through.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Removes this session's sign-out registration.
    ///
    /// Returns true the first time only.
    pub fn detach(&self) -> bool {
        self.registration.unregister()
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.registration.unregister();
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.current_user().map(|u| u.id))
            .field("detached", &self.registration.is_detached())
            .finish_non_exhaustive()
    }
}
