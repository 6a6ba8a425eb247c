//! Containment policy applied to every provider call.

use crate::config::PipelineSettings;
use crate::error::{LectioError, Result};
use crate::generation::Generated;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout, retry and pacing rules for a single provider call.
///
/// A call never returns an error: failures, timeouts and panics become
/// [`Generated::Failed`] carrying the last error seen. A panic is not retried.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    /// Pause after each call, successful or not.
    pub spacing: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::from_settings(&PipelineSettings::default())
    }
}

impl CallPolicy {
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            timeout: settings.call_timeout(),
            max_retries: settings.max_retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
            spacing: Duration::from_millis(settings.call_spacing_ms),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Run `attempt` under the policy. `operation` names the call in logs.
    pub async fn call<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Generated<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt_no: u32 = 0;
        loop {
            attempt_no += 1;

            let guarded = AssertUnwindSafe(async { attempt().await }).catch_unwind();
            let outcome = match tokio::time::timeout(self.timeout, guarded).await {
                Ok(Ok(result)) => result,
                Ok(Err(panic)) => {
                    let reason = panic_message(panic.as_ref());
                    warn!("{}: panicked: {}", operation, reason);
                    self.pace().await;
                    return Generated::failed(format!("{} panicked: {}", operation, reason));
                }
                Err(_) => Err(LectioError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(value) => {
                    debug!("{}: success", operation);
                    self.pace().await;
                    return Generated::Ok(value);
                }
                Err(e) if attempt_no <= self.max_retries => {
                    warn!(
                        "{}: attempt {}/{} failed: {}",
                        operation,
                        attempt_no,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    warn!("{}: failed: {}", operation, e);
                    self.pace().await;
                    return Generated::failed(e);
                }
            }
        }
    }

    async fn pace(&self) {
        if !self.spacing.is_zero() {
            tokio::time::sleep(self.spacing).await;
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
