//! Stream event and cursor types.

use serde_json::Value;

use crate::error::SteamBotsError;

/// Opaque resumption cursor taken from an event's `id` field.
///
/// Numeric and string ids are both accepted; the cursor is sent back to the
/// server verbatim as the `since_id` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Create a cursor from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The cursor as sent in `since_id`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read a cursor out of a JSON id value.
    ///
    /// Returns `None` for anything but a string or a number.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Cursor {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for Cursor {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One decoded message from the event stream.
///
/// Only the `id` and `type` envelope fields are interpreted; the whole
/// decoded object is kept as the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    id: Option<Cursor>,
    event_type: Option<String>,
    payload: Value,
}

impl StreamEvent {
    /// Decode a single frame.
    ///
    /// The frame must be a JSON object. Missing or non-scalar `id`/`type`
    /// fields are tolerated and simply left unset.
    pub fn from_slice(frame: &[u8]) -> Result<Self, SteamBotsError> {
        let payload: Value = serde_json::from_slice(frame).map_err(|e| {
            SteamBotsError::StreamDecode(format!(
                "{}: {}",
                e,
                String::from_utf8_lossy(frame)
            ))
        })?;
        Self::from_value(payload)
    }

    /// Wrap an already decoded JSON value.
    pub fn from_value(payload: Value) -> Result<Self, SteamBotsError> {
        let Some(object) = payload.as_object() else {
            return Err(SteamBotsError::StreamDecode(format!(
                "expected a JSON object, got {}",
                payload
            )));
        };
        let id = object.get("id").and_then(Cursor::from_json);
        let event_type = object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            id,
            event_type,
            payload,
        })
    }

    /// The event id, used as the resumption cursor.
    pub fn id(&self) -> Option<&Cursor> {
        self.id.as_ref()
    }

    /// The event type, used for topic dispatch.
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// The full decoded message.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consume the event and return the decoded message.
    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Deserialize the message into a caller-supplied type.
    pub fn payload_as<T>(&self) -> Result<T, SteamBotsError>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(T::deserialize(&self.payload)?)
    }
}
