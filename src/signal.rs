//! Per-request cancellation.
//!
//! Every translated request carries an [`AbortSignal`] in its extensions.
//! The listener holds the matching [`AbortGuard`] across the delegate await:
//! when the client disconnects, hyper drops the per-request future, the
//! guard drops unfired, and the signal transitions exactly once. A response
//! that completes normally disarms the guard first, so the signal never
//! fires for finished requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

struct Shared {
    aborted: AtomicBool,
    notify: Notify,
}

/// Observer half of the cancellation pair.
///
/// Clonable; all clones observe the same one-shot transition.
#[derive(Clone)]
pub struct AbortSignal {
    inner: Arc<Shared>,
}

impl AbortSignal {
    /// Whether the signal has fired.
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Resolves once the signal has fired. Returns immediately if it
    /// already has.
    pub async fn aborted(&self) {
        while !self.is_aborted() {
            let notified = self.inner.notify.notified();
            // The abort may land between the check above and the waiter
            // registration; re-check before suspending.
            if self.is_aborted() {
                break;
            }
            notified.await;
        }
    }
}

/// Firing half of the cancellation pair.
///
/// Fires its [`AbortSignal`] when dropped, unless [`disarm`](Self::disarm)
/// was called first. The swap on the shared flag guarantees the transition
/// happens at most once no matter how many clones of the signal exist.
pub struct AbortGuard {
    inner: Arc<Shared>,
    disarmed: bool,
}

impl AbortGuard {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                aborted: AtomicBool::new(false),
                notify: Notify::new(),
            }),
            disarmed: false,
        }
    }

    /// A signal observing this guard.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal { inner: Arc::clone(&self.inner) }
    }

    /// Consumes the guard without firing. Call after the response has been
    /// produced.
    pub fn disarm(mut self) {
        self.disarmed = true;
    }
}

impl Default for AbortGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if self.disarmed {
            return;
        }
        if !self.inner.aborted.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }
}
