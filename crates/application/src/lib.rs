//! GymTrack Application - Ports, auth coordination, and session handling
//!
//! This crate defines the application layer with:
//! - Port traits (transport, token and user storage)
//! - The single-flight token refresh coordinator
//! - The typed API client and the signed-in session
//! - Application-level error handling

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod session;

pub use auth::{
    Classification, Outcome, REFRESH_PATH, RefreshState, SignOutHandle, SignOutRegistry,
    TokenRefreshCoordinator, classify,
};
pub use client::ApiClient;
pub use error::{ApiError, ApiResult, RefreshError};
pub use ports::{
    FileSystem, FileSystemError, StoreError, TokenStore, Transport, TransportError, UserStore,
};
pub use session::AuthSession;
