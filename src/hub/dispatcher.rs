//! Subscription table and synchronous event dispatch.

use crate::error::Result;
use crate::types::{Event, Filter, SubscriptionId};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Event type sent when a page becomes active.
pub const PAGE_LOAD: &str = "page-load";
/// Event type sent when a page is torn down.
pub const PAGE_UNLOAD: &str = "page-unload";

/// Listener callback invoked with each matching event.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Internal subscription state.
struct Subscription {
    id: SubscriptionId,
    filter: Filter,
    listener: Listener,
    oneshot: bool,
}

/// Snapshot of a subscription taken at the start of a dispatch.
struct DispatchEntry {
    id: SubscriptionId,
    filter: Filter,
    listener: Listener,
    oneshot: bool,
}

/// Process-wide publish/subscribe dispatcher.
///
/// Subscriptions live until explicitly removed; owning components must
/// unsubscribe on teardown or the table grows without bound. Removal is
/// idempotent. Delivery is fully synchronous: `send` returns only after
/// every matching listener has run.
pub struct EventHub {
    /// Registered subscriptions in registration order.
    subscriptions: RwLock<Vec<Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl EventHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener for events matching `filter`.
    ///
    /// Returns a fresh id usable for later removal. Ids are never reused
    /// while registered. The subscription stays registered until
    /// [`unsubscribe`](Self::unsubscribe) is called.
    pub fn subscribe<F>(&self, filter: impl Into<Filter>, listener: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(filter.into(), Arc::new(listener), false)
    }

    /// Register a listener that is removed after its first delivery.
    pub fn subscribe_oneshot<F>(&self, filter: impl Into<Filter>, listener: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(filter.into(), Arc::new(listener), true)
    }

    /// Register with a JSON-shaped filter: a string is shorthand for
    /// `{eventType: s}`, an object is taken field-by-field.
    ///
    /// Fails with [`HubError::InvalidFilter`](crate::HubError::InvalidFilter)
    /// on any other JSON shape.
    pub fn subscribe_value<F>(&self, filter: Value, listener: F) -> Result<SubscriptionId>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Ok(self.register(Filter::from_value(filter)?, Arc::new(listener), false))
    }

    /// Remove a subscription. Unknown or already-removed ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|sub| sub.id != id);
        if subs.len() < before {
            debug!(subscription = %id, "unsubscribed");
        }
    }

    /// Number of currently registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Construct an event from `event_type` and `data` and deliver it
    /// synchronously to every matching subscription, in registration order.
    ///
    /// `data` is expected to be a JSON object; any `eventType` field inside
    /// it is overridden by the explicit `event_type` argument. Returns the
    /// number of listeners invoked; zero matches is `0`, never an error.
    ///
    /// Dispatch iterates a snapshot of the table taken at the start of the
    /// call: a subscription added by a listener during delivery does not
    /// receive this event, and one removed during delivery is skipped. A
    /// matching oneshot is deregistered right after its listener runs; if
    /// several oneshots share an identical filter, only the first in
    /// registration order fires per `send`, the rest stay registered for
    /// the next matching `send`.
    ///
    /// Listener panics are not isolated: a panicking listener unwinds out
    /// of `send` and the remaining subscriptions are not visited.
    pub fn send(&self, event_type: &str, data: Value) -> usize {
        let event = Event::new(event_type, data);
        trace!(event = ?event, "dispatching");

        let snapshot: Vec<DispatchEntry> = self
            .subscriptions
            .read()
            .iter()
            .map(|sub| DispatchEntry {
                id: sub.id,
                filter: sub.filter.clone(),
                listener: Arc::clone(&sub.listener),
                oneshot: sub.oneshot,
            })
            .collect();

        let mut delivered = 0;
        let mut consumed_oneshot_filters: Vec<Filter> = Vec::new();

        for entry in snapshot {
            // Skip subscriptions removed by an earlier listener in this dispatch.
            if !self.is_registered(entry.id) {
                continue;
            }
            if entry.oneshot && consumed_oneshot_filters.contains(&entry.filter) {
                continue;
            }
            if !entry.filter.matches(&event) {
                continue;
            }
            (entry.listener)(&event);
            delivered += 1;
            if entry.oneshot {
                self.unsubscribe(entry.id);
                consumed_oneshot_filters.push(entry.filter);
            }
        }
        delivered
    }

    // --- Page lifecycle helpers ---

    /// Subscribe to `page-load` events for one page.
    ///
    /// Sugar for a two-field filter on `eventType` and `pageId`.
    pub fn on_page_load<F>(&self, page_id: &str, listener: F, oneshot: bool) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let filter = Filter::event_type(PAGE_LOAD).field("pageId", page_id);
        self.register(filter, Arc::new(listener), oneshot)
    }

    /// Subscribe to `page-unload` events for one page.
    pub fn on_page_unload<F>(&self, page_id: &str, listener: F, oneshot: bool) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let filter = Filter::event_type(PAGE_UNLOAD).field("pageId", page_id);
        self.register(filter, Arc::new(listener), oneshot)
    }

    fn register(&self, filter: Filter, listener: Listener, oneshot: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        debug!(subscription = %id, filter = ?filter, oneshot, "subscribed");
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            listener,
            oneshot,
        });
        id
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.subscriptions.read().iter().any(|sub| sub.id == id)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
