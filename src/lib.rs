//! # lambda-request - call AWS Lambda functions like HTTP endpoints
//!
//! Functions deployed behind an HTTP adapter (API Gateway style events,
//! `serverless-http` and friends) can be invoked directly, skipping the
//! gateway. This crate builds the HTTP-shaped event, invokes the function
//! synchronously and turns its reply back into a response.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  RequestOptions   ┌──────────────────────────────────┐
//! │    caller     │ ────────────────▶ │           Translator             │
//! └───────────────┘                   │  merge defaults → build event    │
//!         ▲                           └──────────────────────────────────┘
//!         │ Resolved                                  │ InvokePayload
//!         │                                           ▼
//! ┌──────────────────────────────────┐  ┌──────────────────────────────────┐
//! │ decode → gunzip? → parse json?   │◀─│  Invoker (one client per region, │
//! │ → full response or body          │  │  held by the ClientCache)        │
//! └──────────────────────────────────┘  └──────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lambda_request::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let cache = ClientCache::from_env().await;
//!     let site = Translator::configure(
//!         &cache,
//!         InvocationConfig::new("arn:aws:lambda:us-east-1:123456789012:function:site"),
//!     )
//!     .await;
//!
//!     let response = site
//!         .send(
//!             RequestOptions::new()
//!                 .uri("/api/items?page=2")
//!                 .gzip(true)
//!                 .json(true)
//!                 .resolve_full_response(true),
//!         )
//!         .await?;
//!
//!     println!("{:?}", response);
//!     Ok(())
//! }
//! ```
//!
//! ## Strict mode
//!
//! By default any resolved status of 400 or above is returned as
//! [`RequestError::Strict`], carrying the function's payload. Turn it off
//! with `RequestOptions::strict(false)` to inspect error responses yourself.
//! A function error (an exception inside the function) always resolves to 500.

pub mod error;
pub mod http;
pub mod invoke;
pub mod translator;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{RequestError, TransportError};
    pub use crate::http::{LambdaResponse, RequestBody, RequestOptions, ResponseBody, StatusCode};
    pub use crate::invoke::{ClientCache, Invoker, LogType};
    pub use crate::translator::{request_once, InvocationConfig, Resolved, Translator};
}

// Re-export for convenience
pub use error::{RequestError, TransportError};
pub use http::{LambdaResponse, RequestOptions, ResponseBody};
pub use invoke::{ClientCache, Invoker, LambdaInvoker};
pub use translator::{request_once, InvocationConfig, Resolved, Translator};
