//! Remote invocation: bounded calls and bounded-attempt retries.

mod client;
mod retry;

pub use client::{EdgeInvoker, HttpEdgeClient};
pub use retry::{invoke_with_retry, retry_with_backoff, RetryPolicy};
