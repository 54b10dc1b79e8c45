//! In-process publish/subscribe event bus.
//!
//! Producers fire named events carrying a [`Payload`]; consumers subscribe
//! [`Handler`]s to event names. Events can be dispatched immediately
//! ([`EventSender::fire`]) or batched until the host's [`Scheduler`] runs a
//! flush ([`AsyncEventSender::fire_async`]).

pub mod bus;
mod error;
pub mod event;
pub mod receiver;
pub mod sender;

pub use bus::{AsyncEventBus, SimpleEventBus};
pub use error::{BoxError, BusError};
pub use event::{BusEvent, EventType, Names, Payload, TypedEvent};
pub use receiver::{
    EventConsumer, EventReceiver, Handler, HandlerResult, HandlerTable, IntoHandlerResult,
    Receiver, Subscription,
};
pub use sender::{
    AsyncEventSender, DeferredSender, EventSender, ManualScheduler, ScheduleHandle, Scheduler,
};
#[cfg(feature = "tokio")]
pub use sender::TokioScheduler;

/// The sender and receiver traits, for glob import.
pub mod prelude {
    pub use crate::receiver::EventReceiver;
    pub use crate::sender::{AsyncEventSender, EventSender};
}
