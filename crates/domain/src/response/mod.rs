//! HTTP Response domain types

mod backend_error;
mod spec;

pub use backend_error::{AuthErrorCode, BackendError};
pub use spec::ApiResponse;
