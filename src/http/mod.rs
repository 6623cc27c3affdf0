//! HTTP-shaped types on both sides of a function invocation.

mod request;
mod response;

pub use request::{split_uri, QueryParameters, Request, RequestBody, RequestOptions};
pub use response::{LambdaResponse, ResponseBody, StatusCode};
