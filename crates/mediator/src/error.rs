//! Mediator error types.

use thiserror::Error;

/// Error type returned by notification handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration errors raised at dispatch time.
///
/// These are never retried: they mean the handler table built at startup
/// does not match what the caller expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediatorError {
    /// No handler is registered for the request type.
    #[error("No handler registered for request {request_type}")]
    NoHandler { request_type: &'static str },

    /// More than one handler is registered for the request type.
    #[error("Request {request_type} has {count} handlers registered, expected exactly one")]
    MultipleHandlers {
        request_type: &'static str,
        count: usize,
    },
}

/// Result type for mediator operations.
pub type Result<T> = std::result::Result<T, MediatorError>;
