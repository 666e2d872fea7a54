//! Authentication domain types

mod types;

pub use types::{RefreshTokenResponse, SessionResponse, TokenPair, token_preview};
