//! Receiving side of the bus: handlers, the registry and consumer binding.

mod binder;
mod handler;
mod registry;
mod subscription;

pub use binder::{EventConsumer, HandlerTable};
pub use handler::{Handler, HandlerResult, IntoHandlerResult};
pub use registry::Receiver;
pub use subscription::Subscription;

use crate::error::BusError;
use crate::event::Names;
use std::rc::Rc;

/// Subscription API shared by [`Receiver`] and the bus facades.
pub trait EventReceiver {
    /// Subscribe `handler` to `names` until it is removed.
    fn on(&self, names: impl Into<Names>, handler: &Handler) -> Subscription;

    /// Subscribe `handler` to the next dispatch of each of `names`.
    fn one(&self, names: impl Into<Names>, handler: &Handler) -> Subscription;

    /// Remove `handler` from the persistent and one-shot handlers of `names`.
    fn off(&self, names: impl Into<Names>, handler: &Handler);

    /// Subscribe `handler` to every event.
    fn on_all(&self, handler: &Handler) -> Subscription;

    /// Detach `handler` from everything it is subscribed to.
    fn off_all(&self, handler: &Handler);

    /// Bind all handlers declared by `consumer`.
    fn register_handler<T: EventConsumer>(
        &self,
        consumer: &Rc<T>,
        include_ancestors: bool,
    ) -> Result<(), BusError>;

    /// Remove all handlers bound for `consumer`.
    fn unregister_handler<T: EventConsumer>(&self, consumer: &Rc<T>) -> Result<(), BusError>;
}

impl EventReceiver for Receiver {
    fn on(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        Receiver::on(self, names, handler)
    }

    fn one(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        Receiver::one(self, names, handler)
    }

    fn off(&self, names: impl Into<Names>, handler: &Handler) {
        Receiver::off(self, names, handler)
    }

    fn on_all(&self, handler: &Handler) -> Subscription {
        Receiver::on_all(self, handler)
    }

    fn off_all(&self, handler: &Handler) {
        Receiver::off_all(self, handler)
    }

    fn register_handler<T: EventConsumer>(
        &self,
        consumer: &Rc<T>,
        include_ancestors: bool,
    ) -> Result<(), BusError> {
        Receiver::register_handler(self, consumer, include_ancestors)
    }

    fn unregister_handler<T: EventConsumer>(&self, consumer: &Rc<T>) -> Result<(), BusError> {
        Receiver::unregister_handler(self, consumer)
    }
}
