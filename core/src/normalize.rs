//! Conversion of raw HTTP responses into `NormalizedResponse`.

use tracing::info;

use crate::codec;
use crate::error::Result;
use crate::http::{HttpResponse, Verb};
use crate::types::NormalizedResponse;

/// Decode and classify a response received for `verb`.
///
/// Any status normalizes; `success` is derived from it. Only a body that is
/// not UTF-8 JSON is an error.
pub fn normalize(verb: Verb, response: HttpResponse) -> Result<NormalizedResponse> {
    let raw_body = codec::decode_text(response.body)?;
    let body = codec::parse_json(&raw_body)?;
    let normalized = NormalizedResponse::new(response.status, body, raw_body);

    info!(
        %verb,
        status = normalized.status(),
        success = normalized.is_success(),
        "normalized response"
    );
    Ok(normalized)
}
