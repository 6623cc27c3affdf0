//! Request description for a function invocation.

use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Plain text.
    Text(String),
    /// Structured value, meant to be sent with `json` enabled.
    Json(serde_json::Value),
    /// Raw bytes, sent as (lossy) UTF-8 text.
    Bytes(Bytes),
}

impl RequestBody {
    /// A JSON `null` body, which is sent as no body at all.
    pub fn is_null(&self) -> bool {
        matches!(self, RequestBody::Json(serde_json::Value::Null))
    }

    /// Encode the body for the invoke payload.
    ///
    /// With `json` the body is JSON-encoded (a text body becomes a quoted
    /// JSON string); otherwise it is coerced to its string form.
    pub fn encode(&self, json: bool) -> String {
        match (self, json) {
            (RequestBody::Text(text), false) => text.clone(),
            (RequestBody::Text(text), true) => serde_json::Value::from(text.as_str()).to_string(),
            (RequestBody::Bytes(bytes), false) => String::from_utf8_lossy(bytes).into_owned(),
            (RequestBody::Bytes(bytes), true) => {
                serde_json::Value::from(String::from_utf8_lossy(bytes)).to_string()
            }
            (RequestBody::Json(serde_json::Value::String(text)), false) => text.clone(),
            (RequestBody::Json(value), _) => value.to_string(),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes.into())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Per-call request options.
///
/// Every field is optional. Options passed to a call are merged over the
/// defaults captured when the translator was configured: a field set on the
/// call wins, an unset one falls back to the default, and anything still
/// unset gets the value documented on [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Replaces the default header map as a whole; maps are not merged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_full_response: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the request URI (path and optional query string).
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Ask the function for a gzip-encoded response and inflate it.
    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = Some(gzip);
        self
    }

    /// JSON-encode the request body and parse the response body.
    pub fn json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    /// Resolve with the whole response instead of just its body.
    pub fn resolve_full_response(mut self, full: bool) -> Self {
        self.resolve_full_response = Some(full);
        self
    }

    /// Reject responses with a status code of 400 or above.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Merge these options over `defaults`; fields set here take precedence.
    pub fn merged_over(self, defaults: &RequestOptions) -> RequestOptions {
        RequestOptions {
            method: self.method.or_else(|| defaults.method.clone()),
            uri: self.uri.or_else(|| defaults.uri.clone()),
            headers: self.headers.or_else(|| defaults.headers.clone()),
            body: self.body.or_else(|| defaults.body.clone()),
            gzip: self.gzip.or(defaults.gzip),
            json: self.json.or(defaults.json),
            resolve_full_response: self.resolve_full_response.or(defaults.resolve_full_response),
            strict: self.strict.or(defaults.strict),
        }
    }

    /// Fill every unset field with its default.
    pub fn resolve(self) -> Request {
        Request {
            method: self.method.unwrap_or_else(|| "GET".to_string()),
            uri: self.uri.unwrap_or_else(|| "/".to_string()),
            headers: self.headers.unwrap_or_default(),
            body: self.body,
            gzip: self.gzip.unwrap_or(false),
            json: self.json.unwrap_or(false),
            resolve_full_response: self.resolve_full_response.unwrap_or(false),
            strict: self.strict.unwrap_or(true),
        }
    }
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method, `GET` by default.
    pub method: String,
    /// Request URI, `/` by default.
    pub uri: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<RequestBody>,
    pub gzip: bool,
    pub json: bool,
    pub resolve_full_response: bool,
    /// `true` by default.
    pub strict: bool,
}

impl Default for Request {
    fn default() -> Self {
        RequestOptions::default().resolve()
    }
}

/// Query string parameters.
///
/// Keys keep every value in order of appearance. A key seen once serializes
/// as a string and a repeated key as an array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters(BTreeMap<String, Vec<String>>);

impl QueryParameters {
    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let mut params = BTreeMap::<String, Vec<String>>::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self(params)
    }

    /// First value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Every value of a key.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for QueryParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, values) in &self.0 {
            match values.as_slice() {
                [single] => map.serialize_entry(key, single)?,
                many => map.serialize_entry(key, many)?,
            }
        }
        map.end()
    }
}

/// Split a request URI into its path and decoded query parameters.
///
/// The fragment is dropped and the path is kept exactly as written. An
/// absolute URI is reduced to its path and query; an empty path becomes `/`.
pub fn split_uri(uri: &str) -> (String, QueryParameters) {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);

    if has_scheme(uri) {
        if let Ok(url) = url::Url::parse(uri) {
            let path = if url.path().is_empty() { "/" } else { url.path() };
            let query = url.query().map(QueryParameters::parse).unwrap_or_default();
            return (path.to_string(), query);
        }
    }

    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, QueryParameters::parse(query)),
        None => (uri, QueryParameters::default()),
    };

    let path = if path.is_empty() { "/" } else { path };
    (path.to_string(), query)
}

/// Whether `uri` starts with `scheme://`.
///
/// A `://` after the first `/`, `?` or `#` belongs to the path or query.
fn has_scheme(uri: &str) -> bool {
    let Some((scheme, _)) = uri.split_once("://") else {
        return false;
    };
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
