//! Request translation: HTTP-shaped request in, invoke call, HTTP-shaped
//! response out.

mod config;
pub mod decode;

pub use config::{InvocationConfig, DEFAULT_QUALIFIER};

use crate::error::RequestError;
use crate::http::{split_uri, LambdaResponse, Request, RequestOptions, ResponseBody};
use crate::invoke::{ClientCache, InvokePayload, Invoker};
use decode::{decode_reply, gunzip_blocking, is_gzip_encoding, json_stage};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// What a request resolves with.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The whole response, when `resolve_full_response` is set.
    Response(LambdaResponse),
    /// Only the body (the default).
    Body(Option<ResponseBody>),
}

impl Resolved {
    /// The body, whichever shape was resolved.
    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            Resolved::Response(response) => response.body.as_ref(),
            Resolved::Body(body) => body.as_ref(),
        }
    }

    pub fn into_body(self) -> Option<ResponseBody> {
        match self {
            Resolved::Response(response) => response.body,
            Resolved::Body(body) => body,
        }
    }

    /// The full response, if one was resolved.
    pub fn into_response(self) -> Option<LambdaResponse> {
        match self {
            Resolved::Response(response) => Some(response),
            Resolved::Body(_) => None,
        }
    }
}

/// Sends HTTP-shaped requests to one function.
///
/// Cheap to clone; clones share the configuration and the invoker.
#[derive(Clone)]
pub struct Translator {
    config: Arc<InvocationConfig>,
    invoker: Arc<dyn Invoker>,
}

impl Translator {
    /// Bind a translator to the function named in `config`, taking the
    /// client for its region from `cache`.
    pub async fn configure(cache: &ClientCache, config: InvocationConfig) -> Self {
        let invoker = cache.get(config.region()).await;
        Self::with_invoker(config, invoker)
    }

    /// Bind a translator to an explicit invoker.
    pub fn with_invoker(config: InvocationConfig, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            config: Arc::new(config),
            invoker,
        }
    }

    /// The configuration this translator was bound with.
    pub fn config(&self) -> &InvocationConfig {
        &self.config
    }

    /// Build the invoke payload for a resolved request.
    pub fn build_payload(&self, request: &Request) -> InvokePayload {
        let (path, query) = split_uri(&request.uri);

        let mut headers = request.headers.clone();
        if request.gzip {
            headers.insert("Accept-Encoding".to_string(), "gzip".to_string());
        }

        let body = request
            .body
            .as_ref()
            .filter(|body| !body.is_null())
            .map(|body| body.encode(request.json));

        // serverless-http reads `httpMethod`; `method` is kept for other adapters.
        let event = json!({
            "method": request.method,
            "httpMethod": request.method,
            "headers": headers,
            "body": body,
            "path": path,
            "queryStringParameters": query,
        });

        InvokePayload {
            function_name: self.config.function_name.clone(),
            invocation_type: InvokePayload::REQUEST_RESPONSE,
            log_type: self.config.log_type,
            payload: event.to_string(),
            qualifier: self.config.qualifier.clone(),
        }
    }

    /// Send a request.
    ///
    /// `options` are merged over the configured defaults. Fails only when
    /// the invoke call fails or, in strict mode, when the resolved status is
    /// 400 or above.
    #[tracing::instrument(skip_all, fields(function = %self.config.function_name))]
    pub async fn send(&self, options: RequestOptions) -> Result<Resolved, RequestError> {
        let request = options.merged_over(&self.config.defaults).resolve();

        let payload = self.build_payload(&request);
        debug!(?payload, "invoking");

        let output = self.invoker.invoke(payload).await?;
        if let Some(version) = &output.executed_version {
            debug!(executed_version = %version, "invoked");
        }
        if let Some(tail) = output.log_tail() {
            debug!(log_tail = %tail, "function log");
        }
        let decoded = decode_reply(output, request.strict)?;
        let mut response = decoded.response;

        if request.gzip && decoded.base64_encoded {
            let gzipped = response
                .get_header("content-encoding")
                .is_some_and(|value| is_gzip_encoding(value));
            let compressed = match &response.body {
                Some(ResponseBody::Bytes(body)) if gzipped => Some(body.clone()),
                _ => None,
            };
            if let Some(body) = compressed {
                let inflated = gunzip_blocking(body).await;
                if inflated.is_replaced() {
                    // No longer gzipped.
                    response.remove_header("content-encoding");
                }
                response.body = Some(ResponseBody::Bytes(inflated.into_inner()));
            }
        }

        if request.json {
            response.body = response.body.map(|body| json_stage(body).into_inner());
        }

        Ok(if request.resolve_full_response {
            Resolved::Response(response)
        } else {
            Resolved::Body(response.body)
        })
    }

    /// [`send`](Self::send) for callback-style callers.
    ///
    /// `callback` sees the outcome before it is returned.
    pub async fn send_with_callback<F>(
        &self,
        options: RequestOptions,
        callback: F,
    ) -> Result<Resolved, RequestError>
    where
        F: FnOnce(Result<&Resolved, &RequestError>),
    {
        let result = self.send(options).await;
        callback(result.as_ref());
        result
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Configure a translator and send one request with it, the config's
/// defaults serving as the request.
pub async fn request_once(
    cache: &ClientCache,
    config: InvocationConfig,
) -> Result<Resolved, RequestError> {
    Translator::configure(cache, config)
        .await
        .send(RequestOptions::default())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RequestBody;
    use crate::invoke::LogType;

    struct Unreachable;

    #[async_trait::async_trait]
    impl Invoker for Unreachable {
        async fn invoke(
            &self,
            _payload: InvokePayload,
        ) -> Result<crate::invoke::InvokeOutput, crate::error::TransportError> {
            Err(crate::error::TransportError::new("unreachable"))
        }
    }

    fn translator(config: InvocationConfig) -> Translator {
        Translator::with_invoker(config, Arc::new(Unreachable))
    }

    fn event(payload: &InvokePayload) -> serde_json::Value {
        serde_json::from_str(&payload.payload).unwrap()
    }

    #[test]
    fn test_payload_envelope() {
        let translator = translator(
            InvocationConfig::new("arn:aws:lambda:us-east-1:1:function:site")
                .qualifier("prod")
                .log_type(LogType::Tail),
        );
        let payload = translator.build_payload(&Request::default());

        assert_eq!(payload.function_name, "arn:aws:lambda:us-east-1:1:function:site");
        assert_eq!(payload.invocation_type, "RequestResponse");
        assert_eq!(payload.log_type, LogType::Tail);
        assert_eq!(payload.qualifier, "prod");

        let event = event(&payload);
        assert_eq!(event["method"], "GET");
        assert_eq!(event["httpMethod"], "GET");
        assert_eq!(event["path"], "/");
        assert_eq!(event["body"], serde_json::Value::Null);
        assert_eq!(event["headers"], json!({}));
        assert_eq!(event["queryStringParameters"], json!({}));
    }

    #[test]
    fn test_payload_event() {
        let translator = translator(InvocationConfig::new("site"));
        let request = RequestOptions::new()
            .method("POST")
            .uri("/items?sort=desc")
            .header("Content-Type", "application/json")
            .body(json!({ "name": "widget" }))
            .json(true)
            .gzip(true)
            .resolve();

        let event = event(&translator.build_payload(&request));
        assert_eq!(event["httpMethod"], "POST");
        assert_eq!(event["path"], "/items");
        assert_eq!(event["queryStringParameters"], json!({ "sort": "desc" }));
        assert_eq!(event["body"], r#"{"name":"widget"}"#);
        assert_eq!(
            event["headers"],
            json!({ "Content-Type": "application/json", "Accept-Encoding": "gzip" })
        );
    }

    #[test]
    fn test_payload_text_body() {
        let translator = translator(InvocationConfig::new("site"));
        let request = RequestOptions::new()
            .body(RequestBody::from("a=1&b=2"))
            .resolve();
        let event = event(&translator.build_payload(&request));
        assert_eq!(event["body"], "a=1&b=2");
    }

    #[test]
    fn test_payload_null_body_is_absent() {
        let translator = translator(InvocationConfig::new("site"));
        let request = RequestOptions::new()
            .body(serde_json::Value::Null)
            .json(true)
            .resolve();
        let event = event(&translator.build_payload(&request));
        assert_eq!(event["body"], serde_json::Value::Null);

        let request = RequestOptions::new().body(json!(false)).json(true).resolve();
        let event = self::event(&translator.build_payload(&request));
        assert_eq!(event["body"], "false");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let result = translator(InvocationConfig::new("site"))
            .send(RequestOptions::new())
            .await;
        match result {
            Err(RequestError::Transport(e)) => assert_eq!(e.message, "unreachable"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
