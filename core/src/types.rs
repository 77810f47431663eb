//! Values exchanged with callers: outgoing payloads and normalized responses.
//!
//! # Design
//! JSON data is carried as `serde_json::Value`, the tagged
//! Null | Bool | Number | String | Array | Object variant, so arbitrary shapes
//! round-trip and callers pattern-match instead of downcasting.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::{Error, Result};

/// Data sent with a replace, merge or append.
///
/// `Empty` means "no data". Replacing a path with no data deletes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    /// A structured JSON value, serialized by the client.
    Structured(Value),
    /// Pre-serialized JSON text, sent as given.
    Raw(String),
}

impl Payload {
    /// Wrap pre-serialized JSON text.
    pub fn raw(json: impl Into<String>) -> Self {
        Payload::Raw(json.into())
    }

    /// Convert any `Serialize` type into a structured payload.
    pub fn from_serializable<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        match serde_json::to_value(data) {
            Ok(value) => Ok(Payload::Structured(value)),
            Err(e) => {
                error!(error = %e, "unable to convert payload to JSON");
                Err(Error::Serialization(e))
            }
        }
    }

    /// Whether this payload carries no data.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Structured(Value::Null) => true,
            Payload::Structured(Value::Object(map)) => map.is_empty(),
            Payload::Structured(_) => false,
            Payload::Raw(json) => json.trim().is_empty(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Structured(Value::Object(map))
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(data: Option<T>) -> Self {
        data.map(Into::into).unwrap_or_default()
    }
}

/// The uniform result of every verb operation.
///
/// `body` is always the parse of `raw_body`; an unparsable body is reported
/// as an error instead of producing this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    success: bool,
    status: u16,
    body: Value,
    raw_body: String,
}

impl NormalizedResponse {
    pub(crate) fn new(status: u16, body: Value, raw_body: String) -> Self {
        Self {
            success: (200..300).contains(&status),
            status,
            body,
            raw_body,
        }
    }

    /// True iff the HTTP status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The parsed body. `Value::Null` when the body was empty or `null`.
    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Deserialize the parsed body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }

    /// The key the server generated for an append, if this is its response.
    pub fn generated_key(&self) -> Option<&str> {
        self.body.get("name").and_then(Value::as_str)
    }
}

impl fmt::Display for NormalizedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} (success: {})\n{}",
            self.status, self.success, self.raw_body
        )
    }
}
