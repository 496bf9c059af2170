//! Error types for the hub and request layer.

use thiserror::Error;

/// Main error type.
///
/// The surface is deliberately narrow: subscription removal is idempotent
/// and `send` never fails (zero matches returns a count of 0). A listener
/// passed to `subscribe` is always invocable by construction, so the
/// "invalid listener" failure of looser runtimes has no runtime
/// representation here.
#[derive(Debug, Error)]
pub enum HubError {
    /// A JSON-shaped filter was neither a string nor an object.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The transport failed to complete a request (network failure,
    /// malformed response). Carried into request `error` observers.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
