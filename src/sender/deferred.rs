//! Deferred, batched dispatch.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::scheduler::{ScheduleHandle, Scheduler, Task};
use crate::error::BusError;
use crate::event::Payload;
use crate::receiver::{HandlerResult, IntoHandlerResult};

/// Delivers one event synchronously. Usually [`crate::Receiver::dispatch_event`].
pub type Dispatcher = Rc<dyn Fn(&str, Payload) -> Result<(), BusError>>;

/// Receives the failures isolated during a flush.
pub type ErrorReporter = Rc<dyn Fn(&BusError)>;

/// Completion callback of a deferred event.
pub type Callback = Box<dyn FnOnce() -> HandlerResult>;

struct PendingEvent {
    name: String,
    payload: Payload,
    callback: Option<Callback>,
}

/// A queue exists exactly while a flush for it is scheduled.
struct PendingBatch {
    generation: u64,
    handle: ScheduleHandle,
    events: Vec<PendingEvent>,
}

#[derive(Default)]
struct SenderState {
    generation: u64,
    batch: Option<PendingBatch>,
    destroyed: bool,
}

/// Default [`ErrorReporter`]: logs the failure.
pub fn log_error(error: &BusError) {
    let step = match error {
        BusError::Callback { .. } => "callback",
        _ => "dispatch",
    };
    tracing::error!(
        step,
        event = error.event().unwrap_or_default(),
        error = %error,
        "failed to deliver deferred event"
    );
}

/// Batches `fire_async` calls into a single scheduled flush.
///
/// The first `fire_async` of an idle sender schedules one flush on `S` and
/// starts a fresh queue; later calls only append. The flush detaches the queue
/// before delivering anything, so events fired from inside handlers start a
/// new batch. Within a flush, events are delivered in the order they were
/// fired. A failing handler or callback is passed to the error reporter and
/// the flush moves on.
pub struct DeferredSender<S: Scheduler> {
    dispatcher: Dispatcher,
    reporter: ErrorReporter,
    scheduler: S,
    state: Rc<RefCell<SenderState>>,
}

impl<S: Scheduler> DeferredSender<S> {
    /// A sender that hands queued events to `dispatcher` from a task on
    /// `scheduler`.
    ///
    /// Dispatch failures go to the default reporter, which logs them at `error`.
    pub fn new<D>(dispatcher: D, scheduler: S) -> Self
    where
        D: Fn(&str, Payload) -> Result<(), BusError> + 'static,
    {
        Self {
            dispatcher: Rc::new(dispatcher),
            reporter: Rc::new(log_error),
            scheduler,
            state: Rc::new(RefCell::new(SenderState::default())),
        }
    }

    /// Replace the error reporter used during flushes.
    pub fn with_error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&BusError) + 'static,
    {
        self.reporter = Rc::new(reporter);
        self
    }

    /// The scheduler flushes are queued on.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Dispatch immediately.
    pub fn fire(&self, name: &str, payload: Payload) -> Result<(), BusError> {
        (self.dispatcher)(name, payload)
    }

    /// Queue an event for the next flush.
    pub fn fire_async(&self, name: impl Into<String>, payload: Payload) {
        self.enqueue(PendingEvent {
            name: name.into(),
            payload,
            callback: None,
        });
    }

    /// Queue an event and run `callback` once it has been dispatched.
    ///
    /// The callback runs even when a handler of the event failed.
    pub fn fire_async_with<F, R>(&self, name: impl Into<String>, payload: Payload, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoHandlerResult,
    {
        self.enqueue(PendingEvent {
            name: name.into(),
            payload,
            callback: Some(Box::new(move || callback().into_handler_result())),
        });
    }

    /// Events are always flushed in submission order.
    pub fn is_ordered(&self) -> bool {
        true
    }

    /// Whether a flush is scheduled.
    pub fn is_pending(&self) -> bool {
        self.state.borrow().batch.is_some()
    }

    /// Number of events waiting for the scheduled flush.
    pub fn pending_len(&self) -> usize {
        self.state
            .borrow()
            .batch
            .as_ref()
            .map_or(0, |batch| batch.events.len())
    }

    /// Cancel the scheduled flush and drop the queued events undelivered.
    ///
    /// Later `fire_async` calls are ignored.
    pub fn destroy(&self) {
        let batch = {
            let mut state = self.state.borrow_mut();
            state.destroyed = true;
            state.batch.take()
        };

        if let Some(batch) = batch {
            self.scheduler.cancel(batch.handle);
            tracing::debug!(
                dropped = batch.events.len(),
                "deferred sender destroyed with pending events"
            );
        }
    }

    fn enqueue(&self, event: PendingEvent) {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            tracing::warn!(event = %event.name, "deferred sender destroyed, dropping event");
            return;
        }

        if state.batch.is_none() {
            state.generation += 1;
            let generation = state.generation;
            let handle = self.scheduler.schedule_once(self.flush_task(generation));
            state.batch = Some(PendingBatch {
                generation,
                handle,
                events: Vec::new(),
            });
        }

        if let Some(batch) = state.batch.as_mut() {
            batch.events.push(event);
        }
    }

    fn flush_task(&self, generation: u64) -> Task {
        let state = Rc::downgrade(&self.state);
        let dispatcher = Rc::clone(&self.dispatcher);
        let reporter = Rc::clone(&self.reporter);
        Box::new(move || flush(&state, generation, &dispatcher, &reporter))
    }
}

fn flush(
    state: &Weak<RefCell<SenderState>>,
    generation: u64,
    dispatcher: &Dispatcher,
    reporter: &ErrorReporter,
) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let batch = {
        let mut state = state.borrow_mut();
        match state.batch.take() {
            Some(batch) if batch.generation == generation => batch,
            other => {
                state.batch = other;
                return;
            }
        }
    };

    tracing::debug!(events = batch.events.len(), "flushing deferred events");

    for PendingEvent {
        name,
        payload,
        callback,
    } in batch.events
    {
        if let Err(error) = dispatcher(&name, payload) {
            reporter(&error);
        }

        if let Some(callback) = callback {
            if let Err(source) = callback() {
                reporter(&BusError::Callback { event: name, source });
            }
        }
    }
}
