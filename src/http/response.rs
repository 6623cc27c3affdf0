//! Decoded response of a function invocation.

use bytes::Bytes;
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    /// Check if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Check if the status code indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Check if the status code indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }

    /// 400 and above; these are rejected in strict mode.
    pub fn is_error(&self) -> bool {
        self.0 >= 400
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

/// Response body in whichever representation the pipeline left it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Body passed through as the function returned it.
    Text(String),
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Base64-decoded (and possibly gunzipped) bytes.
    Bytes(Bytes),
}

impl ResponseBody {
    /// Raw bytes of the body. JSON bodies are re-serialized.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            ResponseBody::Text(text) => Bytes::from(text.clone()),
            ResponseBody::Bytes(bytes) => bytes.clone(),
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
        }
    }

    /// Body as text, lossily decoding bytes.
    pub fn text(&self) -> String {
        match self {
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            ResponseBody::Json(value) => value.to_string(),
        }
    }

    /// The parsed JSON value, if the JSON stage succeeded.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        ResponseBody::Bytes(bytes)
    }
}

impl From<serde_json::Value> for ResponseBody {
    fn from(value: serde_json::Value) -> Self {
        ResponseBody::Json(value)
    }
}

/// HTTP-shaped response decoded from a function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaResponse {
    /// Resolved status code.
    pub status: StatusCode,
    /// Headers returned by the function.
    pub headers: HashMap<String, String>,
    /// Response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ResponseBody>,
}

impl LambdaResponse {
    /// Create a new LambdaResponse with the given status code.
    pub fn new(status: impl Into<StatusCode>) -> Self {
        Self {
            status: status.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the response.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    /// Remove a header regardless of case, returning its value.
    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        let name = self
            .headers
            .keys()
            .find(|name| name.eq_ignore_ascii_case(key))
            .cloned()?;
        self.headers.remove(&name)
    }

    /// Get the body as text if present.
    pub fn text_body(&self) -> Option<String> {
        self.body.as_ref().map(ResponseBody::text)
    }

    /// Convert into a hyper response, e.g. to serve it from a proxy.
    pub fn into_http(self) -> hyper::Response<Full<Bytes>> {
        let status = hyper::StatusCode::from_u16(self.status.0).unwrap_or_else(|_| {
            warn!(
                "Invalid status code {}, falling back to 500 Internal Server Error",
                self.status.0
            );
            hyper::StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = hyper::Response::new(Full::new(
            self.body.as_ref().map(ResponseBody::to_bytes).unwrap_or_default(),
        ));
        *response.status_mut() = status;

        for (name, value) in &self.headers {
            match (
                hyper::header::HeaderName::from_bytes(name.as_bytes()),
                hyper::header::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => warn!("Dropping invalid header '{}'", name),
            }
        }

        response
    }
}

impl Default for LambdaResponse {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
