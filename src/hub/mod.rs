//! Publish/subscribe hub for decoupling UI components.
//!
//! The hub is a process-wide synchronous dispatcher: components register a
//! listener with a [`Filter`](crate::Filter) and receive every event whose
//! fields satisfy it, in registration order. Oneshot subscriptions are
//! removed after their first delivery.
//!
//! # Example
//!
//! ```
//! use crosstalk::{EventHub, Filter};
//! use serde_json::json;
//!
//! let hub = EventHub::new();
//!
//! let id = hub.subscribe(Filter::event_type("attachment-uploaded"), |event| {
//!     println!("uploaded: {:?}", event.get("fileId"));
//! });
//!
//! let delivered = hub.send("attachment-uploaded", json!({"fileId": "abc"}));
//! assert_eq!(delivered, 1);
//!
//! hub.unsubscribe(id);
//! ```

mod dispatcher;

pub use dispatcher::{EventHub, Listener, PAGE_LOAD, PAGE_UNLOAD};
