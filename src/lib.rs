//! # Crosstalk
//!
//! In-process coordination primitives for callback-driven UI front ends:
//! a filtered publish/subscribe event hub plus a latest-wins guard for
//! overlapping asynchronous lookups.
//!
//! ## Core Concepts
//!
//! - **Event Hub**: synchronous dispatcher delivering JSON-shaped events
//!   to subscriptions with exact-match filters, in registration order
//! - **Stale-Response Guard**: monotonic epoch counter that lets a
//!   workflow discard responses from superseded request sequences
//! - **Requests**: command/query builders over a pluggable [`Transport`],
//!   with `success`/`error`/`processing`/`pending` observers
//!
//! ## Example
//!
//! ```
//! use crosstalk::{EventHub, Filter, RequestGuard};
//! use serde_json::json;
//!
//! let hub = EventHub::new();
//! hub.subscribe(Filter::event_type("application-created"), |event| {
//!     println!("created {:?}", event.get("applicationId"));
//! });
//! hub.send("application-created", json!({"applicationId": "LP-2024-001"}));
//!
//! let guard = RequestGuard::new();
//! let captured = guard.current();
//! guard.begin_new_sequence();
//! assert!(!guard.is_current(captured));
//! ```

pub mod error;
pub mod guard;
pub mod hub;
pub mod request;
pub mod types;

// Re-exports
pub use error::{HubError, Result};
pub use guard::RequestGuard;
pub use hub::{EventHub, Listener, PAGE_LOAD, PAGE_UNLOAD};
pub use request::{Request, RequestKind, RequestSpec, ResponseCallback, Transport};
pub use types::{Epoch, Event, Filter, SubscriptionId, EVENT_TYPE_FIELD};
