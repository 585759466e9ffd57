//! HTTP client retry utilities for service-to-service communication.
//!
//! Provides configurable retry logic with exponential backoff. Only failures
//! where the request certainly did not take effect are retried: connection
//! errors and `429`/`502`/`503`/`504` responses. Timeouts and `500`s are
//! returned to the caller, since the upstream may have applied the request.

use reqwest::StatusCode;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff before the first retry, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for a single backoff, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_add_jitter")]
    pub add_jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_add_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            add_jitter: default_add_jitter(),
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Create a config for quick retries (smaller backoffs).
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 50,
            max_backoff_ms: 500,
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Calculate backoff duration for a given attempt.
    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff_ms as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // Add up to 25% jitter
            let jitter = (backoff_ms as f64 * 0.25 * rand_jitter()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

/// Simple pseudo-random jitter (0.0 to 1.0) without external dependencies.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

/// Statuses that guarantee the upstream did not act on the request.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Transport errors where the request never reached the upstream.
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect()
}

/// Execute an HTTP call with retry logic.
///
/// `f` builds and sends a fresh request on every attempt. The last response
/// is returned as-is once retries are exhausted, so callers still inspect the
/// status themselves.
///
/// # Example
/// ```ignore
/// let response = retry_http_call(&RetryConfig::default(), "submit_bill", || {
///     client.post(&url).json(&snapshot).send()
/// })
/// .await?;
/// ```
pub async fn retry_http_call<F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;

    loop {
        let outcome = f().await;

        let retryable = match &outcome {
            Ok(response) => is_retryable_status(response.status()),
            Err(error) => is_retryable_error(error),
        };

        if !retryable {
            if attempt > 0 && outcome.is_ok() {
                info!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    "HTTP call completed after retry"
                );
            }
            return outcome;
        }

        if attempt >= config.max_retries {
            warn!(
                operation = operation_name,
                attempt = attempt + 1,
                "HTTP call failed after max retries"
            );
            return outcome;
        }

        let backoff = config.backoff_duration(attempt);
        match &outcome {
            Ok(response) => warn!(
                operation = operation_name,
                attempt = attempt + 1,
                status = response.status().as_u16(),
                backoff_ms = backoff.as_millis() as u64,
                "HTTP call failed, retrying after backoff"
            ),
            Err(error) => warn!(
                operation = operation_name,
                attempt = attempt + 1,
                error = %error,
                backoff_ms = backoff.as_millis() as u64,
                "HTTP call failed, retrying after backoff"
            ),
        }

        sleep(backoff).await;
        attempt += 1;
    }
}
