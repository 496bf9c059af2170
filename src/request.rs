//! Command/query request builder over a pluggable transport.
//!
//! The remote API is an opaque collaborator reached through a uniform
//! request object: build a query or command, attach observers, then
//! [`call`](Request::call) it against a [`Transport`]. The transport owns
//! all wire concerns (encoding, timeouts, retries); this module only
//! defines the seam and the observer sequencing around one dispatch.
//!
//! Observer sequencing per `call`: `pending(true)`, `processing(true)`,
//! dispatch; on completion `processing(false)`, `pending(false)`, then
//! exactly one of `success` or `error`.
//!
//! # Example
//!
//! ```no_run
//! use crosstalk::{Request, Transport};
//! # fn with_transport(transport: &dyn Transport) {
//! Request::query("municipality-by-location")
//!     .param("x", 404622)
//!     .param("y", 6693880)
//!     .success(|data| println!("resolved: {data}"))
//!     .error(|err| println!("lookup failed: {err}"))
//!     .call(transport);
//! # }
//! ```

use crate::error::HubError;
use serde_json::{Map, Value};
use std::fmt;

/// Whether a request reads or mutates remote state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Read-only lookup.
    Query,
    /// State-changing operation.
    Command,
}

/// The transport-facing shape of a request: kind, name and parameters.
#[derive(Clone, PartialEq)]
pub struct RequestSpec {
    pub kind: RequestKind,
    pub name: String,
    pub params: Map<String, Value>,
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RequestSpec({:?} {} {})",
            self.kind,
            self.name,
            Value::Object(self.params.clone())
        )
    }
}

/// Completion callback handed to the transport along with each dispatch.
pub type ResponseCallback = Box<dyn FnOnce(Result<Value, HubError>)>;

/// Dispatches requests to the remote API.
///
/// `dispatch` must invoke `done` exactly once, from the same cooperative
/// event loop the caller runs on. Completion order across requests is
/// unconstrained; callers needing latest-wins semantics layer a
/// [`RequestGuard`](crate::RequestGuard) over their success handlers.
pub trait Transport {
    fn dispatch(&self, spec: RequestSpec, done: ResponseCallback);
}

/// A single query or command being assembled for dispatch.
///
/// Observers are optional; an unobserved outcome is silently dropped.
pub struct Request {
    spec: RequestSpec,
    success: Option<Box<dyn FnOnce(Value)>>,
    error: Option<Box<dyn FnOnce(&HubError)>>,
    processing: Option<Box<dyn Fn(bool)>>,
    pending: Option<Box<dyn Fn(bool)>>,
}

impl Request {
    /// Start building a read-only query.
    pub fn query(name: &str) -> Self {
        Self::new(RequestKind::Query, name)
    }

    /// Start building a state-changing command.
    pub fn command(name: &str) -> Self {
        Self::new(RequestKind::Command, name)
    }

    fn new(kind: RequestKind, name: &str) -> Self {
        Request {
            spec: RequestSpec {
                kind,
                name: name.to_string(),
                params: Map::new(),
            },
            success: None,
            error: None,
            processing: None,
            pending: None,
        }
    }

    /// Attach a parameter, replacing any prior value for the key.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.spec.params.insert(key.to_string(), value.into());
        self
    }

    /// Observer for a successful response body.
    pub fn success(mut self, observer: impl FnOnce(Value) + 'static) -> Self {
        self.success = Some(Box::new(observer));
        self
    }

    /// Observer for a failed dispatch.
    pub fn error(mut self, observer: impl FnOnce(&HubError) + 'static) -> Self {
        self.error = Some(Box::new(observer));
        self
    }

    /// Observer toggled while the request is in flight.
    pub fn processing(mut self, observer: impl Fn(bool) + 'static) -> Self {
        self.processing = Some(Box::new(observer));
        self
    }

    /// Observer toggled while a response is outstanding.
    pub fn pending(mut self, observer: impl Fn(bool) + 'static) -> Self {
        self.pending = Some(Box::new(observer));
        self
    }

    /// The spec as the transport will see it.
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Dispatch the request. Consumes the builder.
    pub fn call(self, transport: &dyn Transport) {
        let Request {
            spec,
            success,
            error,
            processing,
            pending,
        } = self;

        if let Some(observer) = &pending {
            observer(true);
        }
        if let Some(observer) = &processing {
            observer(true);
        }

        let done: ResponseCallback = Box::new(move |result| {
            if let Some(observer) = &processing {
                observer(false);
            }
            if let Some(observer) = &pending {
                observer(false);
            }
            match result {
                Ok(data) => {
                    if let Some(observer) = success {
                        observer(data);
                    }
                }
                Err(err) => {
                    if let Some(observer) = error {
                        observer(&err);
                    }
                }
            }
        });

        transport.dispatch(spec, done);
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request").field("spec", &self.spec).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Transport double that completes each dispatch immediately with a
    /// canned result.
    struct ImmediateTransport {
        result: RefCell<Option<Result<Value, HubError>>>,
        seen: RefCell<Vec<RequestSpec>>,
    }

    impl ImmediateTransport {
        fn ok(data: Value) -> Self {
            Self {
                result: RefCell::new(Some(Ok(data))),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: RefCell::new(Some(Err(HubError::Transport(message.to_string())))),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for ImmediateTransport {
        fn dispatch(&self, spec: RequestSpec, done: ResponseCallback) {
            self.seen.borrow_mut().push(spec);
            done(self.result.borrow_mut().take().expect("single dispatch"));
        }
    }

    #[test]
    fn test_builder_collects_kind_name_and_params() {
        let request = Request::query("municipality-by-location")
            .param("x", 1)
            .param("y", 2);
        assert_eq!(request.spec().kind, RequestKind::Query);
        assert_eq!(request.spec().name, "municipality-by-location");
        assert_eq!(request.spec().params.get("y"), Some(&json!(2)));

        let command = Request::command("create-application");
        assert_eq!(command.spec().kind, RequestKind::Command);
    }

    #[test]
    fn test_success_path_runs_success_not_error() {
        let transport = ImmediateTransport::ok(json!({"result": "753"}));
        let outcome = Rc::new(RefCell::new(String::new()));

        let got = Rc::clone(&outcome);
        let failed = Rc::clone(&outcome);
        Request::query("municipality-by-location")
            .success(move |data| *got.borrow_mut() = data["result"].to_string())
            .error(move |_| *failed.borrow_mut() = "error".to_string())
            .call(&transport);

        assert_eq!(*outcome.borrow(), "\"753\"");
        assert_eq!(transport.seen.borrow().len(), 1);
    }

    #[test]
    fn test_error_path_runs_error_not_success() {
        let transport = ImmediateTransport::failing("connection refused");
        let outcome = Rc::new(RefCell::new(String::new()));

        let got = Rc::clone(&outcome);
        let failed = Rc::clone(&outcome);
        Request::query("municipality-by-location")
            .success(move |_| *got.borrow_mut() = "success".to_string())
            .error(move |err| *failed.borrow_mut() = err.to_string())
            .call(&transport);

        assert_eq!(*outcome.borrow(), "Transport error: connection refused");
    }

    #[test]
    fn test_observer_sequencing_around_dispatch() {
        let transport = ImmediateTransport::ok(json!({}));
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let pending_log = Rc::clone(&log);
        let processing_log = Rc::clone(&log);
        let success_log = Rc::clone(&log);
        Request::command("create-application")
            .pending(move |on| pending_log.borrow_mut().push(format!("pending={on}")))
            .processing(move |on| processing_log.borrow_mut().push(format!("processing={on}")))
            .success(move |_| success_log.borrow_mut().push("success".to_string()))
            .call(&transport);

        assert_eq!(
            *log.borrow(),
            vec![
                "pending=true",
                "processing=true",
                "processing=false",
                "pending=false",
                "success"
            ]
        );
    }

    #[test]
    fn test_unobserved_outcome_is_dropped() {
        let transport = ImmediateTransport::failing("boom");
        // No observers attached; completion must not panic.
        Request::query("address-by-point").call(&transport);
    }
}
