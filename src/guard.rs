//! Latest-wins guard for overlapping asynchronous lookups.
//!
//! A workflow that fires several lookups per user action (resolve
//! municipality, property id and address for one map click) may see
//! responses from a superseded action arrive after a newer one started.
//! [`RequestGuard`] suppresses those: each lookup captures the current
//! [`Epoch`] when issued, and its success handler applies only if that
//! epoch is still current when the response lands.
//!
//! The guard is logical cancellation only. In-flight requests are not
//! aborted; late results are discarded at the point where state would be
//! mutated, which is sufficient because success handlers are the only
//! place state is mutated.
//!
//! # Example
//!
//! ```
//! use crosstalk::RequestGuard;
//!
//! let guard = RequestGuard::new();
//!
//! let stale = guard.current();
//! guard.begin_new_sequence();
//!
//! assert!(!guard.is_current(stale));
//! assert!(guard.is_current(guard.current()));
//! ```

use crate::types::Epoch;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Monotonic epoch counter owned by one workflow instance.
///
/// Initialized to 0, bumped once per user action that invalidates prior
/// in-flight lookups, never decremented or reset. Cloning is cheap and
/// shares the counter, so gated handlers can outlive the borrow that
/// created them; no component other than the owning workflow may bump it.
///
/// Failure handlers are deliberately not gated: a lookup failure always
/// surfaces its fallback (e.g. enabling manual entry) even when the
/// sequence has been superseded, so the user is never left stuck by a
/// late failure. Only success handlers go through [`gate`](Self::gate) or
/// an explicit [`is_current`](Self::is_current) check.
#[derive(Clone)]
pub struct RequestGuard {
    epoch: Arc<AtomicU64>,
}

impl RequestGuard {
    /// Create a guard at epoch 0.
    pub fn new() -> Self {
        Self {
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Invalidate all in-flight lookups and return the new current epoch.
    ///
    /// Call once per user-driven action (map click, new search) before
    /// issuing the action's lookups.
    pub fn begin_new_sequence(&self) -> Epoch {
        let next = Epoch(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
        trace!(epoch = next.0, "new request sequence");
        next
    }

    /// The current epoch, captured by lookups at issue time.
    pub fn current(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::SeqCst))
    }

    /// True iff `captured` is still the current epoch.
    pub fn is_current(&self, captured: Epoch) -> bool {
        self.current() == captured
    }

    /// Wrap a success handler so it runs only if the epoch captured now is
    /// still current when the response arrives. Stale responses are
    /// silently dropped.
    pub fn gate<T, F>(&self, apply: F) -> impl FnOnce(T) + 'static
    where
        T: 'static,
        F: FnOnce(T) + 'static,
    {
        let guard = self.clone();
        let captured = self.current();
        move |value: T| {
            if guard.is_current(captured) {
                apply(value);
            } else {
                trace!(
                    captured = captured.0,
                    current = guard.current().0,
                    "dropping stale response"
                );
            }
        }
    }
}

impl Default for RequestGuard {
    fn default() -> Self {
        Self::new()
    }
}
