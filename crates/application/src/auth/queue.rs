//! Calls suspended while a token refresh is in flight.

use std::collections::VecDeque;

use gymtrack_domain::{ApiRequest, TokenPair};
use tokio::sync::oneshot;

use crate::error::RefreshError;

/// How a refresh cycle ended, as seen by one waiting call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// New tokens are available; the call should be replayed.
    Resolved(TokenPair),
    /// The refresh failed; the call fails with this error.
    Rejected(RefreshError),
}

/// Delivered to a waiting caller when its slot is fulfilled.
///
/// Hands back the request exactly as it was captured so the replay uses
/// the original method, path, headers, and logical body.
#[derive(Debug)]
pub struct Wakeup {
    /// The suspended request
    pub request: ApiRequest,
    /// Refresh outcome
    pub outcome: SlotOutcome,
}

/// One suspended call.
#[derive(Debug)]
pub struct PendingCall {
    position: u64,
    request: ApiRequest,
    slot: oneshot::Sender<Wakeup>,
}

impl PendingCall {
    /// Arrival position within the current refresh cycle.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// The captured request.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Fulfils the slot, consuming the call.
    ///
    /// Returns false when the caller has gone away; the outcome is dropped.
    pub fn fulfill(self, outcome: SlotOutcome) -> bool {
        self.slot
            .send(Wakeup {
                request: self.request,
                outcome,
            })
            .is_ok()
    }
}

/// FIFO of calls waiting on the current refresh cycle.
#[derive(Debug, Default)]
pub struct RequestQueue {
    calls: VecDeque<PendingCall>,
    next_position: u64,
}

impl RequestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: VecDeque::new(),
            next_position: 0,
        }
    }

    /// Appends a request and returns the receiving end of its slot.
    pub fn push(&mut self, request: ApiRequest) -> oneshot::Receiver<Wakeup> {
        let (slot, receiver) = oneshot::channel();
        self.calls.push_back(PendingCall {
            position: self.next_position,
            request,
            slot,
        });
        self.next_position += 1;
        receiver
    }

    /// Number of suspended calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if no call is suspended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Fulfils every call in arrival order and leaves the queue empty.
    ///
    /// Returns how many callers were still listening.
    pub fn drain(&mut self, outcome: &SlotOutcome) -> usize {
        self.next_position = 0;
        self.calls
            .drain(..)
            .map(|call| call.fulfill(outcome.clone()))
            .filter(|delivered| *delivered)
            .count()
    }
}
