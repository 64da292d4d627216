//! Bounded-attempt retry with linear backoff and progress narration.
//!
//! One generic loop serves every unreliable dependency in the pipeline:
//! the AI edge functions (through [`invoke_with_retry`]) and the record
//! store's writes (through [`retry_with_backoff`] directly). The delay
//! before attempt k+1 is `k x backoff_base` (5s, 10s, 15s, ...); no jitter,
//! no cap beyond the attempt budget.

use crate::config::StepPolicy;
use crate::errors::PipelineError;
use crate::invoke::EdgeInvoker;
use crate::run::RunReporter;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Attempt budget and backoff shape for one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Base delay; the sleep before attempt k+1 is `k x base`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and the 5s base.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Sets the backoff base.
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Delay to sleep after the k-th failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(failed_attempt)
    }
}

/// Runs `op` until it succeeds or the attempt budget is exhausted.
///
/// Before each attempt, logs `banner(attempt)`; before each backoff sleep,
/// logs the failure reason and the upcoming delay. On exhaustion returns
/// [`PipelineError::Exhausted`] wrapping the last failure.
pub async fn retry_with_backoff<T, F, Fut, B>(
    policy: &RetryPolicy,
    reporter: &RunReporter,
    mut banner: B,
    mut op: F,
) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
    B: FnMut(u32) -> String,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        reporter.log(banner(attempt));

        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(
                    target: "deckflow::retry",
                    attempt,
                    max_attempts = max,
                    error = %err,
                    "attempt failed"
                );
                if attempt >= max {
                    return Err(PipelineError::Exhausted {
                        attempts: max,
                        last: Box::new(err),
                    });
                }
                let delay = policy.delay_after(attempt);
                reporter.log(format!(
                    "{}: {}. Reintentando en {}s...",
                    err.narration_prefix(),
                    err,
                    delay.as_secs()
                ));
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Invokes a remote edge function with retries.
///
/// A success requires both a transport-level success and a response body
/// carrying no application-level `error` field; an application error is
/// retried like a transport failure but reported with the server-supplied
/// message. The attempt banner carries the step label, attempt counter and
/// configured timeout, matching the product's run-log narration.
pub async fn invoke_with_retry(
    invoker: &dyn EdgeInvoker,
    function: &str,
    body: &serde_json::Value,
    policy: &StepPolicy,
    label: &str,
    reporter: &RunReporter,
) -> Result<serde_json::Value, PipelineError> {
    let max = policy.retry.max_attempts;
    let timeout_secs = policy.timeout.as_secs();

    retry_with_backoff(
        &policy.retry,
        reporter,
        |attempt| format!("{label} (intento {attempt}/{max}, timeout: {timeout_secs}s)..."),
        || async move {
            let value = invoker.invoke(function, body, policy.timeout).await?;
            if let Some(err) = value.get("error").filter(|v| !v.is_null()) {
                let message = err
                    .as_str()
                    .map(str::to_owned)
                    .unwrap_or_else(|| err.to_string());
                return Err(PipelineError::Application { message });
            }
            Ok(value)
        },
    )
    .await
}
