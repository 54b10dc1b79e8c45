//! Synchronous-only bus.

use std::rc::Rc;

use crate::error::BusError;
use crate::event::{Names, Payload};
use crate::receiver::{EventConsumer, EventReceiver, Handler, Receiver, Subscription};
use crate::sender::EventSender;

/// Bus with a handler registry and synchronous `fire` only.
///
/// ```
/// use event_relay::prelude::*;
/// use event_relay::{BusEvent, Handler, Payload, SimpleEventBus};
///
/// let bus = SimpleEventBus::new();
/// bus.on("ping", &Handler::new(|event: &BusEvent| assert_eq!(event.name(), "ping")));
/// bus.fire("ping", Payload::new()).unwrap();
/// ```
#[derive(Default)]
pub struct SimpleEventBus {
    receiver: Receiver,
}

impl SimpleEventBus {
    /// A bus with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry handlers are subscribed on.
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Drop every handler and consumer binding.
    pub fn destroy(&self) {
        self.receiver.destroy();
    }
}

impl EventSender for SimpleEventBus {
    fn fire(&self, name: &str, payload: Payload) -> Result<(), BusError> {
        self.receiver.dispatch_event(name, payload)
    }
}

impl EventReceiver for SimpleEventBus {
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
