//! Decoding of invoke replies into [`LambdaResponse`]s.
//!
//! Gzip and JSON decoding are fallback policies: each stage either replaces
//! the body with the decoded form or keeps what it was given. Neither ever
//! fails the request.

use crate::error::RequestError;
use crate::http::{LambdaResponse, ResponseBody, StatusCode};
use crate::invoke::InvokeOutput;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use bytes::Bytes;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

/// Outcome of a fallback decoding stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Decoding succeeded; this is the new value.
    Replaced(T),
    /// Decoding failed or did not apply; this is the original value.
    Kept(T),
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Decoded::Replaced(value) | Decoded::Kept(value) => value,
        }
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, Decoded::Replaced(_))
    }
}

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Decode base64 with or without padding, in the standard or URL-safe
/// alphabet.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD_LENIENT
        .decode(text)
        .or_else(|_| URL_SAFE_LENIENT.decode(text))
}

/// [`gunzip_stage`] on the blocking pool, so large bodies do not stall the
/// runtime.
pub async fn gunzip_blocking(body: Bytes) -> Decoded<Bytes> {
    let input = body.clone();
    match tokio::task::spawn_blocking(move || gunzip_stage(input)).await {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("gunzip task failed: {}", e);
            Decoded::Kept(body)
        }
    }
}

/// Inflate a gzip body, keeping the original bytes if it is not valid gzip.
pub fn gunzip_stage(body: Bytes) -> Decoded<Bytes> {
    debug!("gunzipping");
    let mut inflated = Vec::new();
    match GzDecoder::new(&body[..]).read_to_end(&mut inflated) {
        Ok(_) => Decoded::Replaced(Bytes::from(inflated)),
        Err(e) => {
            debug!("gunzipping failed: {}", e);
            Decoded::Kept(body)
        }
    }
}

/// Parse a body as JSON, keeping it unchanged if it does not parse.
pub fn json_stage(body: ResponseBody) -> Decoded<ResponseBody> {
    debug!("parsing json");
    let parsed = match &body {
        ResponseBody::Text(text) => serde_json::from_str::<Value>(text),
        ResponseBody::Bytes(bytes) => serde_json::from_slice::<Value>(bytes),
        ResponseBody::Json(_) => return Decoded::Kept(body),
    };
    match parsed {
        Ok(value) => Decoded::Replaced(ResponseBody::Json(value)),
        Err(e) => {
            debug!("json parsing failed: {}", e);
            Decoded::Kept(body)
        }
    }
}

/// A decoded reply, before the optional gzip and JSON stages.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReply {
    pub response: LambdaResponse,
    /// Whether the function declared its body base64-encoded.
    pub base64_encoded: bool,
}

/// Turn a raw invoke reply into a response.
///
/// A function error always resolves to 500. A plain 200 from the invoke
/// call adopts the status the function put in its own response. In strict
/// mode any resolved status of 400 or above is an error carrying the
/// function's payload.
pub fn decode_reply(output: InvokeOutput, strict: bool) -> Result<DecodedReply, RequestError> {
    let document = output.payload.as_ref().and_then(|raw| {
        serde_json::from_slice::<Value>(raw)
            .map_err(|e| warn!("Function payload is not JSON, ignoring it: {}", e))
            .ok()
    });

    let status = if output.function_error.is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        match document.as_ref().and_then(inner_status) {
            Some(inner) if output.status_code == 200 => inner,
            _ => StatusCode(output.status_code),
        }
    };
    debug!(status_code = status.0, "resolved status");

    if strict && status.is_error() {
        let payload = match (document, &output.payload) {
            (Some(document), _) => document,
            (None, Some(raw)) => Value::String(String::from_utf8_lossy(raw).into_owned()),
            (None, None) => Value::Null,
        };
        return Err(RequestError::Strict { status, payload });
    }

    let document = document.unwrap_or(Value::Null);
    let headers = inner_headers(&document);
    debug!(?headers, "response headers");

    let base64_encoded = document
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let body = match document.get("body") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if base64_encoded && !text.is_empty() => {
            match decode_base64(text) {
                Ok(bytes) => Some(ResponseBody::Bytes(Bytes::from(bytes))),
                Err(e) => {
                    warn!("Body is marked base64 but does not decode: {}", e);
                    Some(ResponseBody::Text(text.clone()))
                }
            }
        }
        Some(Value::String(text)) => Some(ResponseBody::Text(text.clone())),
        Some(other) => Some(ResponseBody::Json(other.clone())),
    };

    Ok(DecodedReply {
        response: LambdaResponse {
            status,
            headers,
            body,
        },
        base64_encoded,
    })
}

/// The function's own status code, ignoring zero and unparseable values.
fn inner_status(document: &Value) -> Option<StatusCode> {
    let code = match document.get("statusCode")? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u16::try_from(code)
        .ok()
        .filter(|code| *code != 0)
        .map(StatusCode)
}

fn inner_headers(document: &Value) -> HashMap<String, String> {
    let Some(headers) = document.get("headers").and_then(Value::as_object) else {
        return HashMap::new();
    };
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((name.clone(), value))
        })
        .collect()
}

/// Whether a `content-encoding` value names gzip.
pub fn is_gzip_encoding(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("gzip"))
}
