//! Translator configuration.

use crate::http::RequestOptions;
use crate::invoke::{region_of, LogType};
use serde::{Deserialize, Serialize};

/// Qualifier used when none is given.
pub const DEFAULT_QUALIFIER: &str = "$LATEST";

fn default_qualifier() -> String {
    DEFAULT_QUALIFIER.to_string()
}

/// Function identity plus request defaults, fixed once a translator is
/// configured.
///
/// Deserializes from a single flat object, so the same document can name the
/// function and describe a request:
///
/// ```
/// # use lambda_request::InvocationConfig;
/// let config: InvocationConfig = serde_json::from_str(r#"{
///     "functionName": "arn:aws:lambda:us-east-1:123456789012:function:site",
///     "uri": "/health",
///     "json": true
/// }"#).unwrap();
/// assert_eq!(config.qualifier, "$LATEST");
/// assert_eq!(config.defaults.uri.as_deref(), Some("/health"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationConfig {
    /// Function name or ARN. An ARN carries the region as its 4th segment.
    pub function_name: String,
    /// Version or alias to invoke.
    #[serde(default = "default_qualifier")]
    pub qualifier: String,
    /// Log verbosity.
    #[serde(default)]
    pub log_type: LogType,
    /// Defaults for every request sent through the translator.
    #[serde(flatten)]
    pub defaults: RequestOptions,
}

impl InvocationConfig {
    /// Create a config for `function_name` with default settings.
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            qualifier: default_qualifier(),
            log_type: LogType::default(),
            defaults: RequestOptions::default(),
        }
    }

    /// Set the qualifier.
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Set the log type.
    pub fn log_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    /// Set the request defaults.
    pub fn defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Region the function lives in, if the name is an ARN.
    pub fn region(&self) -> Option<&str> {
        region_of(&self.function_name)
    }
}
