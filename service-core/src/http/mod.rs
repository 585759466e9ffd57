//! Outbound HTTP helpers.

pub mod retry;

pub use retry::{is_retryable_error, is_retryable_status, retry_http_call, RetryConfig};
