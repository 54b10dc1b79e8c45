//! Event payloads - structural records carried by an event.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BusError;

/// Top-level key reserved for the envelope's type tag.
pub const RESERVED_TYPE_FIELD: &str = "type";

/// The data part of an event: a JSON object of scalar or nested fields.
///
/// A payload never carries the reserved [`RESERVED_TYPE_FIELD`] key at its top
/// level; every constructor enforces that.
///
/// ```
/// use event_relay::Payload;
/// use serde_json::json;
///
/// let payload = Payload::try_from(json!({ "user": "a" })).unwrap();
/// assert_eq!(payload.get("user"), Some(&json!("a")));
///
/// assert!(Payload::try_from(json!({ "type": "login" })).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// An empty payload.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Serialize a typed value into a payload.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, BusError> {
        Self::try_from(serde_json::to_value(value)?)
    }

    /// Deserialize the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BusError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<Self, BusError> {
        let key = key.into();
        check_key(&key)?;
        self.0.insert(key, value.into());
        Ok(self)
    }

    /// The value of a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a top-level field named `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All top-level fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn check_key(key: &str) -> Result<(), BusError> {
    if key == RESERVED_TYPE_FIELD {
        return Err(BusError::InvalidArgument(format!(
            "payload field `{}` is reserved for the event type",
            RESERVED_TYPE_FIELD
        )));
    }
    Ok(())
}

impl TryFrom<Map<String, Value>> for Payload {
    type Error = BusError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        if fields.contains_key(RESERVED_TYPE_FIELD) {
            check_key(RESERVED_TYPE_FIELD)?;
        }
        Ok(Self(fields))
    }
}

impl TryFrom<Value> for Payload {
    type Error = BusError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            Value::Null => Ok(Self::new()),
            other => Err(BusError::InvalidArgument(format!(
                "event payload must be an object, got {}",
                kind(&other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        payload.into_value()
    }
}
