//! The envelope handed to every handler.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::Payload;
use crate::error::BusError;

/// Compile-time binding of an event name to its payload type.
///
/// ```
/// use event_relay::EventType;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Login {
///     user: String,
/// }
///
/// impl EventType for Login {
///     const NAME: &'static str = "login";
///     type Payload = Self;
/// }
/// ```
pub trait EventType: 'static {
    const NAME: &'static str;
    type Payload: Serialize + DeserializeOwned;
}

/// An event name paired with its payload.
///
/// Envelopes are built once per dispatch and shared by reference with every
/// handler of that dispatch. They are immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    name: String,
    payload: Payload,
}

impl BusEvent {
    /// Wrap `payload` in an envelope tagged `name`.
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// The event name (the envelope's type tag).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The data carried by the event.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// A payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Checked narrowing by name.
    ///
    /// Fails with [`BusError::TypeMismatch`] when `expected` is not this
    /// event's name.
    pub fn as_name(&self, expected: &str) -> Result<&Self, BusError> {
        if self.name != expected {
            return Err(BusError::TypeMismatch {
                expected: expected.to_string(),
                actual: self.name.clone(),
            });
        }
        Ok(self)
    }

    /// Checked narrowing to a typed event.
    pub fn as_type<E: EventType>(&self) -> Result<TypedEvent<'_, E>, BusError> {
        self.as_name(E::NAME)?;
        Ok(self.as_unchecked())
    }

    /// Narrowing to a typed event without checking the name.
    pub fn as_unchecked<E: EventType>(&self) -> TypedEvent<'_, E> {
        TypedEvent {
            event: self,
            marker: PhantomData,
        }
    }

    /// Same as [`BusEvent::as_unchecked`]. Kept for handlers subscribed to
    /// several names that re-type an event outside the set they listen to.
    pub fn as_any_unchecked<E: EventType>(&self) -> TypedEvent<'_, E> {
        self.as_unchecked()
    }

    /// A copy of the payload alone, for forwarding or serializing.
    pub fn extract_payload(&self) -> Payload {
        self.payload.clone()
    }

    /// Split into the name and the payload.
    pub fn into_parts(self) -> (String, Payload) {
        (self.name, self.payload)
    }
}

impl fmt::Display for BusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A [`BusEvent`] narrowed to the event type `E`.
pub struct TypedEvent<'a, E> {
    event: &'a BusEvent,
    marker: PhantomData<fn() -> E>,
}

impl<'a, E: EventType> TypedEvent<'a, E> {
    /// Decode the payload into `E::Payload`.
    pub fn payload(&self) -> Result<E::Payload, BusError> {
        self.event.payload.decode()
    }

    /// The untyped envelope.
    pub fn event(&self) -> &'a BusEvent {
        self.event
    }
}

impl<E> Deref for TypedEvent<'_, E> {
    type Target = BusEvent;

    fn deref(&self) -> &Self::Target {
        self.event
    }
}

impl<E> Clone for TypedEvent<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for TypedEvent<'_, E> {}

impl<E> fmt::Debug for TypedEvent<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedEvent").field(self.event).finish()
    }
}
