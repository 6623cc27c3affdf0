//! Remote invoke contract and the AWS Lambda client behind it.
//!
//! The translator only talks to an [`Invoker`]: one synchronous
//! (`RequestResponse`) invocation in, the raw reply out. [`LambdaInvoker`]
//! is the production implementation; [`ClientCache`] hands out one invoker
//! per region.

mod aws;
mod cache;

pub use aws::LambdaInvoker;
pub use cache::{ClientCache, InvokerFactory};

use crate::error::TransportError;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Log verbosity requested from the function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    /// No logs in the reply.
    #[default]
    None,
    /// Include the tail of the execution log in the reply.
    Tail,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::None => "None",
            LogType::Tail => "Tail",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(LogType::None),
            "tail" => Ok(LogType::Tail),
            _ => Err(format!("unknown log type '{}', expected None or Tail", s)),
        }
    }
}

/// A synchronous invocation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokePayload {
    /// Function name or ARN.
    pub function_name: String,
    /// Always `RequestResponse`.
    pub invocation_type: &'static str,
    pub log_type: LogType,
    /// JSON-encoded HTTP event handed to the function.
    pub payload: String,
    /// Version or alias to invoke.
    pub qualifier: String,
}

impl InvokePayload {
    pub const REQUEST_RESPONSE: &'static str = "RequestResponse";
}

/// Raw reply of an invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOutput {
    /// Status code of the invoke call itself (200 on synchronous success).
    pub status_code: u16,
    /// Set when the function raised an error.
    pub function_error: Option<String>,
    /// The function's result, normally an HTTP-shaped JSON document.
    pub payload: Option<Bytes>,
    /// Base64-encoded log tail, when requested with [`LogType::Tail`].
    pub log_result: Option<String>,
    /// The version that actually ran.
    pub executed_version: Option<String>,
}

impl InvokeOutput {
    /// A successful reply carrying `payload`.
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            status_code: 200,
            payload: Some(payload.into()),
            ..Default::default()
        }
    }

    /// The decoded log tail, if one was returned.
    pub fn log_tail(&self) -> Option<String> {
        let encoded = self.log_result.as_deref()?;
        match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(tail) => Some(String::from_utf8_lossy(&tail).into_owned()),
            Err(e) => {
                warn!("Could not decode log tail: {}", e);
                None
            }
        }
    }
}

/// Something that can invoke a function and wait for its result.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Perform a single invocation. No retries.
    async fn invoke(&self, payload: InvokePayload) -> Result<InvokeOutput, TransportError>;
}

/// Region encoded in a function ARN (its 4th `:`-separated segment).
///
/// Returns `None` for bare function names, which resolve against the
/// default region.
pub fn region_of(function_name: &str) -> Option<&str> {
    function_name.split(':').nth(3).filter(|region| !region.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_of_arn() {
        assert_eq!(
            region_of("arn:aws:lambda:us-east-1:123456789012:function:my-fn"),
            Some("us-east-1")
        );
        assert_eq!(
            region_of("arn:aws:lambda:eu-west-2:123456789012:function:my-fn:prod"),
            Some("eu-west-2")
        );
    }

    #[test]
    fn test_region_of_bare_name() {
        assert_eq!(region_of("my-fn"), None);
        assert_eq!(region_of("123456789012:function:my-fn"), None);
        assert_eq!(region_of("arn:aws:lambda::123:function:x"), None);
    }

    #[test]
    fn test_log_type_parse() {
        assert_eq!("tail".parse::<LogType>().unwrap(), LogType::Tail);
        assert_eq!("None".parse::<LogType>().unwrap(), LogType::None);
        assert!("verbose".parse::<LogType>().is_err());
        assert_eq!(LogType::Tail.to_string(), "Tail");
    }

    #[test]
    fn test_log_tail() {
        let output = InvokeOutput {
            log_result: Some("U1RBUlQgUmVxdWVzdElkOiAx".to_string()),
            ..InvokeOutput::ok("{}")
        };
        assert_eq!(output.log_tail().as_deref(), Some("START RequestId: 1"));

        let garbled = InvokeOutput {
            log_result: Some("%%%".to_string()),
            ..Default::default()
        };
        assert!(garbled.log_tail().is_none());
        assert!(InvokeOutput::default().log_tail().is_none());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = InvokePayload {
            function_name: "my-fn".to_string(),
            invocation_type: InvokePayload::REQUEST_RESPONSE,
            log_type: LogType::None,
            payload: "{}".to_string(),
            qualifier: "$LATEST".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["FunctionName"], "my-fn");
        assert_eq!(json["InvocationType"], "RequestResponse");
        assert_eq!(json["LogType"], "None");
        assert_eq!(json["Qualifier"], "$LATEST");
    }
}
