//! Event envelopes, payloads and name lists.

mod envelope;
mod names;
mod payload;

pub use envelope::{BusEvent, EventType, TypedEvent};
pub use names::Names;
pub use payload::{Payload, RESERVED_TYPE_FIELD};
