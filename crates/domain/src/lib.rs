//! GymTrack Domain - Core business types
//!
//! This crate defines the domain model for the GymTrack API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod exercise;
pub mod history;
pub mod request;
pub mod response;
pub mod user;

pub use auth::{
    RefreshTokenResponse, SessionResponse, TokenPair, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use exercise::ExerciseDto;
pub use history::{HistoryDto, HistoryGroupDto, total_entries};
pub use request::{ApiRequest, Headers, HttpMethod, RequestBody};
pub use response::{ApiResponse, AuthErrorCode, BackendError};
pub use user::{NewUser, ProfileUpdate, UserDto};
