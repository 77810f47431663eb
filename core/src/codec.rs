//! JSON encoding of request payloads and decoding of response bodies.

use serde_json::Value;
use tracing::error;

use crate::error::{Error, Result};
use crate::types::Payload;

/// Content type of every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// JSON text meaning "no data".
const NO_DATA: &[u8] = b"null";

/// An encoded request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Encode a payload as a JSON request body.
///
/// Empty payloads encode as `null`. Raw JSON text is not re-validated.
pub fn to_request_body(payload: &Payload) -> Result<RequestBody> {
    let bytes = match payload {
        Payload::Structured(value) if !payload.is_empty() => {
            serde_json::to_vec(value).map_err(|e| {
                error!(error = %e, "unable to create request body from data");
                Error::Serialization(e)
            })?
        }
        Payload::Raw(json) if !payload.is_empty() => json.as_bytes().to_vec(),
        _ => NO_DATA.to_vec(),
    };

    Ok(RequestBody {
        bytes,
        content_type: JSON_CONTENT_TYPE,
    })
}

/// Decode a response body into a JSON value.
pub fn from_response_body(bytes: &[u8]) -> Result<Value> {
    let text = decode_text(bytes.to_vec())?;
    parse_json(&text)
}

/// Decode raw body bytes as UTF-8.
pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let raw = String::from_utf8_lossy(e.as_bytes()).into_owned();
        error!(%raw, "unable to convert response body into string");
        Error::ResponseFormat {
            raw,
            source: Box::new(e.utf8_error()),
        }
    })
}

/// Parse body text as JSON. A blank body is the absent value, `Null`.
pub fn parse_json(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        error!(raw = %text, error = %e, "unable to parse response body as JSON");
        Error::ResponseFormat {
            raw: text.to_string(),
            source: Box::new(e),
        }
    })
}
