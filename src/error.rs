//! Error types surfaced by the request pipeline.
//!
//! Only two things can make a request fail: the invoke call itself not
//! completing, and strict mode rejecting an error status. Gzip and JSON
//! decoding never fail a request; see [`crate::translator::decode`].

use crate::http::StatusCode;
use thiserror::Error;

/// The remote invoke call could not complete.
#[derive(Debug, Clone, Error)]
#[error("invoke failed: {message}")]
pub struct TransportError {
    /// Error message, including the underlying SDK context when available.
    pub message: String,
}

impl TransportError {
    /// Create a new TransportError.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by [`crate::Translator::send`].
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The remote call failed outright.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Strict mode is on and the resolved status code is 400 or above.
    #[error("function responded with status {status}: {payload}")]
    Strict {
        /// The resolved status code.
        status: StatusCode,
        /// The decoded inner payload, or the raw payload string when it is not JSON.
        payload: serde_json::Value,
    },
}

impl RequestError {
    /// Status code carried by a strict mode failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Transport(_) => None,
            RequestError::Strict { status, .. } => Some(*status),
        }
    }

    /// Whether this error came from strict mode rather than the transport.
    pub fn is_strict(&self) -> bool {
        matches!(self, RequestError::Strict { .. })
    }
}
