//! Bus with synchronous and deferred dispatch.

use std::rc::Rc;

use crate::error::BusError;
use crate::event::{Names, Payload};
use crate::receiver::{
    EventConsumer, EventReceiver, Handler, IntoHandlerResult, Receiver, Subscription,
};
use crate::sender::{AsyncEventSender, DeferredSender, EventSender, ManualScheduler, Scheduler};

/// Event bus combining a [`Receiver`] with a [`DeferredSender`].
///
/// `fire` dispatches immediately; `fire_async` batches events until the
/// scheduler runs the flush. The bus is ordered: a flush delivers its events
/// in the order they were fired.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use event_relay::prelude::*;
/// use event_relay::{AsyncEventBus, BusEvent, Handler, ManualScheduler, Payload};
///
/// let scheduler = ManualScheduler::new();
/// let bus = AsyncEventBus::new(scheduler.clone());
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = Rc::clone(&seen);
/// bus.on_all(&Handler::new(move |event: &BusEvent| log.borrow_mut().push(event.name().to_string())));
///
/// bus.fire_async("a", Payload::new());
/// bus.fire_async("b", Payload::new());
/// assert!(seen.borrow().is_empty());
///
/// scheduler.run_pending();
/// assert_eq!(*seen.borrow(), vec!["a", "b"]);
/// ```
///
/// Handlers that capture the bus itself form a reference cycle with it;
/// [`AsyncEventBus::destroy`] breaks it.
pub struct AsyncEventBus<S: Scheduler = ManualScheduler> {
    receiver: Receiver,
    sender: DeferredSender<S>,
}

impl<S: Scheduler> AsyncEventBus<S> {
    /// A bus whose deferred sends are flushed by `scheduler`.
    pub fn new(scheduler: S) -> Self {
        let receiver = Receiver::new();
        let dispatch = receiver.clone();
        let sender = DeferredSender::new(
            move |name: &str, payload: Payload| dispatch.dispatch_event(name, payload),
            scheduler,
        );
        Self { receiver, sender }
    }

    /// Replace the reporter that receives handler and callback failures
    /// isolated during a flush. Defaults to [`crate::sender::log_error`].
    pub fn with_error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&BusError) + 'static,
    {
        self.sender = self.sender.with_error_reporter(reporter);
        self
    }

    /// The registry handlers are subscribed on.
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// The deferred sender feeding the registry.
    pub fn sender(&self) -> &DeferredSender<S> {
        &self.sender
    }

    /// The scheduler that runs the flushes.
    pub fn scheduler(&self) -> &S {
        self.sender.scheduler()
    }

    /// Cancel the pending flush (queued events are dropped, not delivered),
    /// then drop every handler and consumer binding.
    pub fn destroy(&self) {
        self.sender.destroy();
        self.receiver.destroy();
    }
}

impl<S: Scheduler> EventSender for AsyncEventBus<S> {
    fn fire(&self, name: &str, payload: Payload) -> Result<(), BusError> {
        self.sender.fire(name, payload)
    }
}

impl<S: Scheduler> AsyncEventSender for AsyncEventBus<S> {
    fn fire_async(&self, name: impl Into<String>, payload: Payload) {
        self.sender.fire_async(name, payload)
    }

    fn fire_async_with<F, R>(&self, name: impl Into<String>, payload: Payload, callback: F)
    where
        F: FnOnce() -> R + 'static,
        R: IntoHandlerResult,
    {
        self.sender.fire_async_with(name, payload, callback)
    }

    fn is_ordered(&self) -> bool {
        self.sender.is_ordered()
    }
}

impl<S: Scheduler> EventReceiver for AsyncEventBus<S> {
    fn on(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        self.receiver.on(names, handler)
    }

    fn one(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        self.receiver.one(names, handler)
    }

    fn off(&self, names: impl Into<Names>, handler: &Handler) {
        self.receiver.off(names, handler)
    }

    fn on_all(&self, handler: &Handler) -> Subscription {
        self.receiver.on_all(handler)
    }

    fn off_all(&self, handler: &Handler) {
        self.receiver.off_all(handler)
    }

    fn register_handler<T: EventConsumer>(
        &self,
        consumer: &Rc<T>,
        include_ancestors: bool,
    ) -> Result<(), BusError> {
        self.receiver.register_handler(consumer, include_ancestors)
    }

    fn unregister_handler<T: EventConsumer>(&self, consumer: &Rc<T>) -> Result<(), BusError> {
        self.receiver.unregister_handler(consumer)
    }
}
