use thiserror::Error;
use uuid::Uuid;

/// Boxed error returned by handlers and completion callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for every bus operation.
#[derive(Debug, Error)]
pub enum BusError {
    /// A checked narrowing was attempted against the wrong event name.
    #[error("mismatching event type: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// An argument was rejected (malformed handler declaration, bad payload).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The consumer is already bound on this receiver.
    #[error("event consumer {consumer} already registered on receiver {receiver}")]
    AlreadyRegistered {
        consumer: &'static str,
        receiver: Uuid,
    },

    /// The consumer has no bindings on this receiver.
    #[error("event consumer {consumer} not registered on receiver {receiver}")]
    NotRegistered {
        consumer: &'static str,
        receiver: Uuid,
    },

    /// A handler failed while the event was being dispatched.
    #[error("failed to dispatch event {event}: {source}")]
    Dispatch {
        event: String,
        #[source]
        source: BoxError,
    },

    /// The completion callback of a deferred event failed.
    #[error("completion callback for event {event} failed: {source}")]
    Callback {
        event: String,
        #[source]
        source: BoxError,
    },

    /// Encoding or decoding a typed payload failed.
    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

impl BusError {
    /// Name of the event the error is about, if any.
    pub fn event(&self) -> Option<&str> {
        match self {
            BusError::TypeMismatch { actual, .. } => Some(actual),
            BusError::Dispatch { event, .. } | BusError::Callback { event, .. } => Some(event),
            _ => None,
        }
    }
}
