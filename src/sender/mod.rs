//! Sending side of the bus: synchronous and deferred dispatch.
//!
//! ## Ordering
//!
//! ```text
//! fire(a)            -> dispatched before fire() returns
//! fire_async(b)      -> queued, flush scheduled
//! fire_async(c)      -> queued behind b
//! fire(d)            -> dispatched now (before b and c)
//! <scheduler turn>   -> flush: b, then c
//! ```
//!
//! Synchronous fires are ordered among themselves, a flush keeps the order of
//! its batch, and nothing orders a flush against synchronous fires made while
//! it was pending.

mod deferred;
mod scheduler;
#[cfg(feature = "tokio")]
mod tokio_scheduler;

pub use deferred::{log_error, Callback, DeferredSender, Dispatcher, ErrorReporter};
pub use scheduler::{ManualScheduler, ScheduleHandle, Scheduler, Task};
#[cfg(feature = "tokio")]
pub use tokio_scheduler::TokioScheduler;

use crate::error::BusError;
use crate::event::{EventType, Payload};
use crate::receiver::IntoHandlerResult;

/// Synchronous firing.
pub trait EventSender {
    /// Dispatch `name` now. Returns once every matching handler ran, or with
    /// the first handler failure.
    fn fire(&self, name: &str, payload: Payload) -> Result<(), BusError>;

    /// Encode a typed payload and fire `E::NAME`.
    fn fire_event<E: EventType>(&self, payload: &E::Payload) -> Result<(), BusError>
    where
        Self: Sized,
    {
        self.fire(E::NAME, Payload::encode(payload)?)
    }
}

/// Deferred firing. Never blocks and never dispatches inline.
pub trait AsyncEventSender {
    fn fire_async(&self, name: impl Into<String>, payload: Payload);

    /// Like `fire_async`, running `callback` after the event was dispatched.
    fn fire_async_with<F, R>(&self, name: impl Into<String>, payload: Payload, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoHandlerResult;

    /// Encode a typed payload and queue `E::NAME`.
    fn fire_event_async<E: EventType>(&self, payload: &E::Payload) -> Result<(), BusError>
    where
        Self: Sized,
    {
        self.fire_async(E::NAME, Payload::encode(payload)?);
        Ok(())
    }

    /// Whether queued events are guaranteed to be dispatched in the order
    /// they were fired.
    fn is_ordered(&self) -> bool;
}

impl<S: Scheduler> EventSender for DeferredSender<S> {
    fn fire(&self, name: &str, payload: Payload) -> Result<(), BusError> {
        DeferredSender::fire(self, name, payload)
    }
}

impl<S: Scheduler> AsyncEventSender for DeferredSender<S> {
    fn fire_async(&self, name: impl Into<String>, payload: Payload) {
        DeferredSender::fire_async(self, name, payload)
    }

    fn fire_async_with<F, R>(&self, name: impl Into<String>, payload: Payload, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoHandlerResult,
    {
        DeferredSender::fire_async_with(self, name, payload, callback)
    }

    fn is_ordered(&self) -> bool {
        DeferredSender::is_ordered(self)
    }
}
