//! Authentication handling for outbound API calls.
//!
//! This module provides:
//! - Classification of completed calls (success, plain failure, auth failure)
//! - The refresh coordinator that renews the access token once for any
//!   number of concurrently failing calls and replays them
//! - The FIFO queue of calls waiting on a refresh
//! - Sign-out callback registration

mod classify;
mod coordinator;
mod queue;
mod sign_out;

pub use classify::{Classification, classify};
pub use coordinator::{Outcome, REFRESH_PATH, RefreshState, TokenRefreshCoordinator};
pub use queue::{PendingCall, RequestQueue, SlotOutcome, Wakeup};
pub use sign_out::{SignOutHandle, SignOutRegistry};
