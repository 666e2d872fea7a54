//! User store port

use async_trait::async_trait;
use gymtrack_domain::UserDto;

use super::StoreError;

/// Persistent storage for the signed-in user's record.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the stored user, or `None` when there is none.
    async fn get(&self) -> Option<UserDto>;

    /// Replaces the stored user.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    async fn save(&self, user: &UserDto) -> Result<(), StoreError>;

    /// Erases the stored user. Removing an absent record succeeds.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be cleared.
    async fn remove(&self) -> Result<(), StoreError>;
}
