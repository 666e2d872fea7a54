//! Token store port
//!
//! Defines the interface for persisting the session's token pair.

use async_trait::async_trait;
use gymtrack_domain::TokenPair;

/// Errors that can occur while persisting session records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Persistent storage for the access/refresh token pair.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the stored pair, or `None` when there is none.
    ///
    /// Implementations treat unreadable storage as "no tokens".
    async fn get(&self) -> Option<TokenPair>;

    /// Replaces the stored pair.
    ///
    /// # Errors
    /// Returns an error if the pair cannot be written.
    async fn save(&self, tokens: &TokenPair) -> Result<(), StoreError>;

    /// Erases the stored pair. Removing an absent pair succeeds.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be cleared.
    async fn remove(&self) -> Result<(), StoreError>;

    /// Returns the stored refresh token, if a usable one exists.
    async fn refresh_token(&self) -> Option<String> {
        self.get()
            .await
            .filter(TokenPair::can_refresh)
            .map(|tokens| tokens.refresh_token)
    }
}
