//! [`Invoker`] backed by the AWS Lambda SDK.

use super::{InvokeOutput, InvokePayload, Invoker, LogType};
use crate::error::TransportError;
use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType as SdkLogType};
use bytes::Bytes;
use tracing::warn;

/// Lambda client bound to one region.
#[derive(Clone, Debug)]
pub struct LambdaInvoker {
    client: aws_sdk_lambda::Client,
}

impl LambdaInvoker {
    pub fn new(client: aws_sdk_lambda::Client) -> Self {
        Self { client }
    }

    /// Build a client from shared AWS configuration, overriding its region
    /// when one is given.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, region: Option<&str>) -> Self {
        let mut builder = aws_sdk_lambda::config::Builder::from(sdk_config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_lambda::config::Region::new(region.to_string()));
        }
        Self::new(aws_sdk_lambda::Client::from_conf(builder.build()))
    }
}

impl From<LogType> for SdkLogType {
    fn from(log_type: LogType) -> Self {
        match log_type {
            LogType::None => SdkLogType::None,
            LogType::Tail => SdkLogType::Tail,
        }
    }
}

#[async_trait]
impl Invoker for LambdaInvoker {
    async fn invoke(&self, payload: InvokePayload) -> Result<InvokeOutput, TransportError> {
        let output = self
            .client
            .invoke()
            .function_name(payload.function_name)
            .invocation_type(InvocationType::from(payload.invocation_type))
            .log_type(payload.log_type.into())
            .payload(Blob::new(payload.payload.into_bytes()))
            .qualifier(payload.qualifier)
            .send()
            .await
            .map_err(|e| TransportError::new(DisplayErrorContext(e).to_string()))?;

        let status_code = u16::try_from(output.status_code()).unwrap_or_else(|_| {
            warn!(
                "Invoke returned out of range status {}, using 500",
                output.status_code()
            );
            500
        });

        Ok(InvokeOutput {
            status_code,
            function_error: output.function_error().map(str::to_string),
            payload: output
                .payload()
                .map(|blob| Bytes::copy_from_slice(blob.as_ref())),
            log_result: output.log_result().map(str::to_string),
            executed_version: output.executed_version().map(str::to_string),
        })
    }
}
