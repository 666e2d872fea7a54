//! Sign-out callback registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registrations {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Callbacks to run when the session must be torn down.
///
/// Several registrations may coexist; each one is notified once per
/// sign-out event.
#[derive(Clone, Default)]
pub struct SignOutRegistry {
    inner: Arc<Mutex<Registrations>>,
}

impl SignOutRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns the handle that detaches it.
    pub fn register<F>(&self, callback: F) -> SignOutHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registrations = self.inner.lock();
        let id = registrations.next_id;
        registrations.next_id += 1;
        registrations.callbacks.push((id, Arc::new(callback)));

        SignOutHandle {
            registry: Arc::downgrade(&self.inner),
            id,
            detached: AtomicBool::new(false),
        }
    }

    /// Runs every registered callback once; returns how many ran.
    ///
    /// Callbacks run outside the registry lock, so a callback may itself
    /// register or unregister.
    pub fn notify(&self) -> usize {
        let callbacks: Vec<Callback> = self
            .inner
            .lock()
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Number of active registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SignOutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOutRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}

/// Detaches one sign-out registration.
///
/// Dropping the handle leaves the registration in place; call
/// [`SignOutHandle::unregister`] on teardown.
#[derive(Debug)]
pub struct SignOutHandle {
    registry: Weak<Mutex<Registrations>>,
    id: u64,
    detached: AtomicBool,
}

impl SignOutHandle {
    /// Removes the registration. Calling it again is a no-op.
    ///
    /// Returns true only for the call that actually removed it.
    pub fn unregister(&self) -> bool {
        if self.detached.swap(true, Ordering::AcqRel) {
            return false;
        }
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registrations = registry.lock();
        let before = registrations.callbacks.len();
        registrations.callbacks.retain(|(id, _)| *id != self.id);
        registrations.callbacks.len() != before
    }

    /// Returns true once `unregister` has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}
